// Task-Modul: Enthält alle Embassy Tasks
//
// Tasks kommunizieren über Embassy Channels
// (Taster → MQTT: Signale, MQTT → Taster: Audio/Settings).

pub mod button;
pub mod mqtt;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use button::button_monitor_task;
pub use mqtt::mqtt_task;
pub use wifi::{connection_task, dhcp_task, net_task};
