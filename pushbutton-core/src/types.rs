//! Core Types für den Taster-Monitor
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::time::Duration;

use crate::config::ConfigError;

/// Höchste gültige GPIO-Nummer (BCM-Nummerierung 0..=27)
pub const MAX_PIN: u8 = 27;

/// Logik-Pegel eines Pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Invertierter Pegel (`1 - level`)
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Pull-Widerstand für den Taster-Eingang
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    Up,
    Down,
}

/// Flanke, auf die der Edge-Latch reagiert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
}

/// Polarität eines Pins
///
/// Setting-Wert 0 = active-low, 1 = active-high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    /// Pegel für "aktiv" (Taster gedrückt / LED an)
    pub fn active_level(self) -> Level {
        match self {
            Polarity::ActiveLow => Level::Low,
            Polarity::ActiveHigh => Level::High,
        }
    }

    /// Pegel für "inaktiv" (`1 - polarity`)
    pub fn inactive_level(self) -> Level {
        self.active_level().inverted()
    }

    /// Active-low braucht Pull-up, active-high Pull-down
    pub fn pull(self) -> Pull {
        match self {
            Polarity::ActiveLow => Pull::Up,
            Polarity::ActiveHigh => Pull::Down,
        }
    }

    /// Flanke beim Drücken
    pub fn press_edge(self) -> Edge {
        match self {
            Polarity::ActiveLow => Edge::Falling,
            Polarity::ActiveHigh => Edge::Rising,
        }
    }
}

impl TryFrom<i64> for Polarity {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Polarity::ActiveLow),
            1 => Ok(Polarity::ActiveHigh),
            other => Err(ConfigError::InvalidPolarity(other)),
        }
    }
}

/// Pin-Konfiguration: GPIO-Nummer + Polarität
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub pin: u8,
    pub polarity: Polarity,
}

impl PinConfig {
    /// Prüft die Pin-Nummer gegen den gültigen Bereich `0..=27`
    pub fn new(pin: i64, polarity: Polarity) -> Result<Self, ConfigError> {
        match u8::try_from(pin) {
            Ok(pin) if pin <= MAX_PIN => Ok(Self { pin, polarity }),
            _ => Err(ConfigError::PinOutOfRange(pin)),
        }
    }
}

/// Monotoner Zeitstempel in Millisekunden
///
/// Wird vom Host bei jedem Tick übergeben (z.B. `embassy_time::Instant::as_millis()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Vergangene Zeit seit `earlier` (0 falls die Uhr rückwärts läuft)
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Erkannter Tastendruck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

impl ButtonEvent {
    /// Signal, das für diesen Tastendruck nach außen geht
    pub fn signal(self) -> OutboundSignal {
        match self {
            ButtonEvent::ShortPress => OutboundSignal::RequestListen,
            ButtonEvent::LongPress => OutboundSignal::RequestStop,
        }
    }
}

/// Signale an den Host (Message-Bus)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutboundSignal {
    /// Kurzer Druck: Zuhören starten
    RequestListen,
    /// Langer Druck oder Watchdog: alles stoppen
    RequestStop,
    /// Für den Benutzer sichtbarer Hinweis: GPIO nicht initialisierbar
    CannotInitialize,
}

impl OutboundSignal {
    /// Payload für den Bus
    pub fn as_str(self) -> &'static str {
        match self {
            OutboundSignal::RequestListen => "listen",
            OutboundSignal::RequestStop => "stop",
            OutboundSignal::CannotInitialize => "error.initialize",
        }
    }
}

/// Audio-Zustand des externen Subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AudioEvent {
    Started,
    Stopped,
}

/// Eingehende Audio-Benachrichtigung mit Quell-Tag
///
/// JSON: `{"event":"started","by":"audio:vlc"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct AudioNotification<'a> {
    pub event: AudioEvent,
    #[cfg_attr(feature = "serde", serde(rename = "by", default))]
    pub source: &'a str,
}

/// Periodische Callbacks, die beim Host-Scheduler registriert werden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickTask {
    /// Taster-Abfrage (0.1 s)
    ButtonPoll,
    /// Watchdog (1 s)
    Heartbeat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_levels() {
        assert_eq!(Polarity::ActiveLow.active_level(), Level::Low);
        assert_eq!(Polarity::ActiveLow.inactive_level(), Level::High);
        assert_eq!(Polarity::ActiveHigh.active_level(), Level::High);
        assert_eq!(Polarity::ActiveHigh.inactive_level(), Level::Low);
    }

    #[test]
    fn test_polarity_selects_pull_and_edge() {
        assert_eq!(Polarity::ActiveLow.pull(), Pull::Up);
        assert_eq!(Polarity::ActiveLow.press_edge(), Edge::Falling);
        assert_eq!(Polarity::ActiveHigh.pull(), Pull::Down);
        assert_eq!(Polarity::ActiveHigh.press_edge(), Edge::Rising);
    }

    #[test]
    fn test_polarity_from_setting() {
        assert_eq!(Polarity::try_from(0i64), Ok(Polarity::ActiveLow));
        assert_eq!(Polarity::try_from(1i64), Ok(Polarity::ActiveHigh));
        assert_eq!(
            Polarity::try_from(2i64),
            Err(ConfigError::InvalidPolarity(2))
        );
    }

    #[test]
    fn test_pin_config_range() {
        assert!(PinConfig::new(0, Polarity::ActiveLow).is_ok());
        assert!(PinConfig::new(27, Polarity::ActiveLow).is_ok());
        assert_eq!(
            PinConfig::new(28, Polarity::ActiveLow),
            Err(ConfigError::PinOutOfRange(28))
        );
        assert_eq!(
            PinConfig::new(-1, Polarity::ActiveLow),
            Err(ConfigError::PinOutOfRange(-1))
        );
    }

    #[test]
    fn test_timestamp_duration_saturates() {
        let early = Timestamp::from_millis(1_000);
        let late = Timestamp::from_millis(3_500);
        assert_eq!(late.duration_since(early), Duration::from_millis(2_500));
        assert_eq!(early.duration_since(late), Duration::ZERO);
    }

    #[test]
    fn test_button_event_signals() {
        assert_eq!(
            ButtonEvent::ShortPress.signal(),
            OutboundSignal::RequestListen
        );
        assert_eq!(ButtonEvent::LongPress.signal(), OutboundSignal::RequestStop);
    }
}
