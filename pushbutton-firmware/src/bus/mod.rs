// Message-Bus zwischen Taster-Task und MQTT-Task
//
// Taster → MQTT: OutboundSignal über PubSubChannel (SignalPublisher)
// MQTT → Taster: MonitorEvent über Channel (MonitorEventSender)
//
// Das JSON-Protokoll selbst liegt in pushbutton-core (Feature "json").

use pushbutton_core::{OutboundSignal, SignalBus, Topics};

use crate::SignalPublisher;
use crate::config::{MQTT_TOPIC_AUDIO, MQTT_TOPIC_SETTINGS};

pub use pushbutton_core::{PayloadError, parse_message};

/// Abonnierte Topics für eingehende Nachrichten
pub const TOPICS: Topics<'static> = Topics {
    audio: MQTT_TOPIC_AUDIO,
    settings: MQTT_TOPIC_SETTINGS,
};

/// SignalBus-Implementierung: published Signale an alle Subscriber (MQTT)
pub struct PubSubBus {
    publisher: SignalPublisher,
}

impl PubSubBus {
    pub fn new(publisher: SignalPublisher) -> Self {
        Self { publisher }
    }
}

impl SignalBus for PubSubBus {
    fn emit(&mut self, signal: OutboundSignal) {
        defmt::info!("Bus: emitting '{}'", signal.as_str());
        // Bei vollem Queue wird die älteste Nachricht verdrängt
        self.publisher.publish_immediate(signal);
    }
}
