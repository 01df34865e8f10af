// Library-Root: Firmware-Module für den Taster-Monitor
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod bus;
pub mod config;
pub mod hal;
pub mod scheduler;
pub mod tasks;

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

use pushbutton_core::{MonitorEvent, OutboundSignal};

use crate::config::EVENT_CHANNEL_CAPACITY;

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Publisher<'static, NoopRawMutex, OutboundSignal, 4, 1, 1>
// Nutze:  SignalPublisher

/// PubSubChannel für ausgehende Signale
/// - 4: Nachrichten-Kapazität im Queue
/// - 1: Maximale Anzahl Subscribers (MQTT)
/// - 1: Maximale Anzahl Publishers (Taster-Task)
pub type SignalChannel = PubSubChannel<NoopRawMutex, OutboundSignal, 4, 1, 1>;

/// Publisher für ausgehende Signale (Taster-Task)
pub type SignalPublisher = Publisher<'static, NoopRawMutex, OutboundSignal, 4, 1, 1>;

/// Subscriber für ausgehende Signale (MQTT-Task)
pub type SignalSubscriber = Subscriber<'static, NoopRawMutex, OutboundSignal, 4, 1, 1>;

/// Channel für eingehende Ereignisse (MQTT → Taster-Task)
pub type MonitorEventChannel = Channel<NoopRawMutex, MonitorEvent, EVENT_CHANNEL_CAPACITY>;

/// Sender für eingehende Ereignisse (MQTT-Task)
pub type MonitorEventSender = Sender<'static, NoopRawMutex, MonitorEvent, EVENT_CHANNEL_CAPACITY>;

/// Receiver für eingehende Ereignisse (Taster-Task)
pub type MonitorEventReceiver =
    Receiver<'static, NoopRawMutex, MonitorEvent, EVENT_CHANNEL_CAPACITY>;
