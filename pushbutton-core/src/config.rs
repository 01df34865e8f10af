//! Einstellungen und Timing
//!
//! Liest die vier Settings (`button_pin`, `button_polarity`, `led_pin`,
//! `led_polarity`) über [`SettingsSource`] und validiert sie zu einer
//! [`MonitorConfig`]. Ungültige Werte deaktivieren den jeweiligen Pin.

use core::time::Duration;

use crate::traits::SettingsSource;
use crate::types::{PinConfig, Polarity};

pub const KEY_BUTTON_PIN: &str = "button_pin";
pub const KEY_BUTTON_POLARITY: &str = "button_polarity";
pub const KEY_LED_PIN: &str = "led_pin";
pub const KEY_LED_POLARITY: &str = "led_polarity";

/// Defaults, wenn ein Setting fehlt
pub const DEFAULT_BUTTON_POLARITY: i64 = 0;
pub const DEFAULT_LED_PIN: i64 = -1;
pub const DEFAULT_LED_POLARITY: i64 = 1;

/// Fehler-Typ für ungültige Einstellungen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `button_pin` fehlt
    ButtonPinMissing,
    /// Pin-Nummer außerhalb `0..=27`
    PinOutOfRange(i64),
    /// Polarität weder 0 noch 1
    InvalidPolarity(i64),
}

/// Zeitkonstanten des Monitors
///
/// In Tests kann die Schwelle verkürzt werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Ab dieser Dauer ist ein Druck "lang" (inklusive)
    pub longpress_threshold: Duration,
    /// Periode der Taster-Abfrage
    pub poll_period: Duration,
    /// Periode des Watchdogs
    pub heartbeat_period: Duration,
    /// Watchdog löst aus nach `watchdog_factor * longpress_threshold`
    pub watchdog_factor: u32,
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            longpress_threshold: Duration::from_secs(2),
            poll_period: Duration::from_millis(100),
            heartbeat_period: Duration::from_secs(1),
            watchdog_factor: 4,
        }
    }

    pub fn with_longpress_threshold(mut self, threshold: Duration) -> Self {
        self.longpress_threshold = threshold;
        self
    }

    /// Maximale plausible Druckdauer (8 s bei Default-Werten)
    ///
    /// Sättigt bei `Duration::MAX`.
    pub fn watchdog_limit(&self) -> Duration {
        self.longpress_threshold.saturating_mul(self.watchdog_factor)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot der Settings, wie ihn der Host liefert
///
/// JSON: `{"button_pin":17,"button_polarity":0,"led_pin":27,"led_polarity":1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SettingsSnapshot {
    pub button_pin: Option<i64>,
    pub button_polarity: Option<i64>,
    pub led_pin: Option<i64>,
    pub led_polarity: Option<i64>,
}

impl SettingsSource for SettingsSnapshot {
    fn get_int(&self, key: &str) -> Option<i64> {
        match key {
            KEY_BUTTON_PIN => self.button_pin,
            KEY_BUTTON_POLARITY => self.button_polarity,
            KEY_LED_PIN => self.led_pin,
            KEY_LED_POLARITY => self.led_polarity,
            _ => None,
        }
    }
}

/// Validierte Pin-Konfiguration für den Monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    pub button: PinConfig,
    /// `None` = keine LED (Monitor läuft nur mit Taster)
    pub led: Option<PinConfig>,
}

impl MonitorConfig {
    /// Liest und validiert die Settings
    ///
    /// # Fehlerbehandlung
    /// Ein ungültiger Taster liefert `Err` (Monitor startet nicht).
    /// Eine ungültige LED wird nur geloggt und deaktiviert.
    pub fn from_settings<S: SettingsSource + ?Sized>(settings: &S) -> Result<Self, ConfigError> {
        let button_pin = settings
            .get_int(KEY_BUTTON_PIN)
            .ok_or(ConfigError::ButtonPinMissing)?;
        let button_polarity = settings
            .get_int(KEY_BUTTON_POLARITY)
            .unwrap_or(DEFAULT_BUTTON_POLARITY);
        info!(
            "Button GPIO pin = {}, polarity = {}",
            button_pin, button_polarity
        );

        let button = Polarity::try_from(button_polarity)
            .and_then(|polarity| PinConfig::new(button_pin, polarity))
            .inspect_err(|e| warn!("Invalid button configuration: {}", e))?;

        let led_pin = settings.get_int(KEY_LED_PIN).unwrap_or(DEFAULT_LED_PIN);
        let led_polarity = settings
            .get_int(KEY_LED_POLARITY)
            .unwrap_or(DEFAULT_LED_POLARITY);
        info!("LED GPIO pin = {}, polarity = {}", led_pin, led_polarity);

        let led = match Polarity::try_from(led_polarity)
            .and_then(|polarity| PinConfig::new(led_pin, polarity))
        {
            Ok(led) => Some(led),
            Err(e) => {
                info!("LED disabled: {}", e);
                None
            }
        };

        Ok(Self { button, led })
    }
}
