//! Pushbutton Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, den Taster-Zustandsautomaten und Pure Functions.

#![no_std]

// Muss als erstes Modul stehen (Makros)
#[macro_use]
mod fmt;

pub mod binding;
pub mod config;
pub mod led;
pub mod monitor;
#[cfg(feature = "json")]
pub mod protocol;
pub mod traits;
pub mod types;
pub mod watchdog;

// Re-exports für einfachen Zugriff
pub use binding::{BindError, GpioBinding};
pub use config::{ConfigError, MonitorConfig, SettingsSnapshot, Timing};
pub use monitor::{ButtonMonitor, ButtonState, MonitorError, PressPhase, Sample};
#[cfg(feature = "json")]
pub use protocol::{
    AUDIO_SOURCE_MAX_LEN, MonitorEvent, PayloadError, Topics, parse_audio, parse_message,
    parse_settings,
};
pub use traits::{
    ButtonInput, GpioDriver, GpioError, LedOutput, ScheduleError, Scheduler, SettingsSource,
    SignalBus,
};
pub use types::{
    AudioEvent, AudioNotification, ButtonEvent, Edge, Level, OutboundSignal, PinConfig, Polarity,
    Pull, TickTask, Timestamp,
};
pub use watchdog::Watchdog;
