//! Bus-Protokoll für eingehende Nachrichten
//!
//! Payloads sind JSON und werden mit serde-json-core geparsed:
//! - Audio:    `{"event":"started","by":"audio:vlc"}`
//! - Settings: `{"button_pin":17,"button_polarity":0,"led_pin":27,"led_polarity":1}`
//!
//! Ausgehende Signale sind einfache Strings (siehe [`OutboundSignal::as_str`]).
//!
//! [`OutboundSignal::as_str`]: crate::types::OutboundSignal::as_str

use heapless::String;

use crate::config::SettingsSnapshot;
use crate::types::{AudioEvent, AudioNotification};

/// Maximale Länge des Quell-Tags (längere Tags werden abgeschnitten)
pub const AUDIO_SOURCE_MAX_LEN: usize = 32;

/// Eingehendes Ereignis für den Taster-Monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Audio gestartet/gestoppt (Quell-Tag nur für das Log)
    Audio {
        event: AudioEvent,
        source: String<AUDIO_SOURCE_MAX_LEN>,
    },
    /// Neuer Settings-Snapshot → Neu-Initialisierung
    Settings(SettingsSnapshot),
}

impl MonitorEvent {
    /// Darf bei voller Queue verworfen werden
    ///
    /// Audio-Zustände werden vom nächsten Ereignis überholt, ein verlorener
    /// Settings-Snapshot würde die alten Pins aktiv lassen.
    pub fn is_droppable(&self) -> bool {
        matches!(self, MonitorEvent::Audio { .. })
    }

    /// Als Notification für `ButtonMonitor::on_audio()`
    pub fn as_audio(&self) -> Option<AudioNotification<'_>> {
        match self {
            MonitorEvent::Audio { event, source } => Some(AudioNotification {
                event: *event,
                source: source.as_str(),
            }),
            MonitorEvent::Settings(_) => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MonitorEvent::Audio { event, source } => {
                defmt::write!(fmt, "Audio({}, by '{}')", event, source.as_str())
            }
            MonitorEvent::Settings(snapshot) => defmt::write!(
                fmt,
                "Settings(button={}, led={})",
                snapshot.button_pin,
                snapshot.led_pin
            ),
        }
    }
}

/// Topics, auf denen eingehende Nachrichten erwartet werden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topics<'a> {
    pub audio: &'a str,
    pub settings: &'a str,
}

/// Fehler beim Parsen eines Payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    InvalidJson,
    UnknownTopic,
}

/// Parsed eine Audio-Benachrichtigung
pub fn parse_audio(payload: &[u8]) -> Result<MonitorEvent, PayloadError> {
    let (notification, _) = serde_json_core::from_slice::<AudioNotification>(payload)
        .map_err(|_| PayloadError::InvalidJson)?;

    let mut source = String::new();
    for c in notification.source.chars() {
        if source.push(c).is_err() {
            break;
        }
    }

    Ok(MonitorEvent::Audio {
        event: notification.event,
        source,
    })
}

/// Parsed einen Settings-Snapshot (fehlende Keys bleiben `None`)
pub fn parse_settings(payload: &[u8]) -> Result<MonitorEvent, PayloadError> {
    let (snapshot, _) = serde_json_core::from_slice::<SettingsSnapshot>(payload)
        .map_err(|_| PayloadError::InvalidJson)?;
    Ok(MonitorEvent::Settings(snapshot))
}

/// Ordnet eine eingehende Nachricht anhand des Topics zu
pub fn parse_message(
    topics: &Topics<'_>,
    topic: &str,
    payload: &[u8],
) -> Result<MonitorEvent, PayloadError> {
    if topic == topics.audio {
        parse_audio(payload)
    } else if topic == topics.settings {
        parse_settings(payload)
    } else {
        Err(PayloadError::UnknownTopic)
    }
}
