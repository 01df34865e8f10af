//! GPIO Binding
//!
//! Übersetzt eine [`MonitorConfig`] in einen Taster-Eingang mit scharfem
//! Edge-Latch und (optional) einen LED-Ausgang im Aus-Zustand.
//! Wird bei jeder Re-Initialisierung neu erzeugt, nie verändert.

use crate::config::MonitorConfig;
use crate::traits::{ButtonInput, GpioDriver, GpioError, LedOutput};
use crate::types::{Level, PinConfig};

/// Fehler beim Binden der Pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// Hardware nicht verfügbar, mit Ursache
    HardwareUnavailable(GpioError),
}

impl From<GpioError> for BindError {
    fn from(cause: GpioError) -> Self {
        BindError::HardwareUnavailable(cause)
    }
}

/// Live-Handles für Taster und LED
pub struct GpioBinding<G: GpioDriver> {
    config: MonitorConfig,
    button: G::Input,
    led: Option<G::Output>,
}

impl<G: GpioDriver> GpioBinding<G> {
    /// Bindet Taster (und LED) an die Hardware
    ///
    /// Active-low → Pull-up + fallende Flanke, active-high → Pull-down + steigende Flanke.
    /// Die LED startet auf dem Aus-Pegel.
    ///
    /// # Fehlerbehandlung
    /// Bei einem Fehler werden bereits belegte Pins wieder freigegeben.
    pub fn bind(driver: &mut G, config: MonitorConfig) -> Result<Self, BindError> {
        let PinConfig { pin, polarity } = config.button;

        let mut button = driver.claim_input(pin, polarity.pull())?;
        if let Err(e) = arm_idempotent(&mut button, config.button) {
            button.disarm_edge();
            driver.release_input(button);
            return Err(e.into());
        }
        info!(
            "Set GPIO pin {} as input, pull {}, edge {}",
            pin,
            polarity.pull(),
            polarity.press_edge()
        );

        let led = match config.led {
            Some(led_cfg) => {
                let off = led_cfg.polarity.inactive_level();
                match driver.claim_output(led_cfg.pin, off) {
                    Ok(output) => {
                        info!("Set GPIO pin {} as LED output (off)", led_cfg.pin);
                        Some(output)
                    }
                    Err(e) => {
                        button.disarm_edge();
                        driver.release_input(button);
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        Ok(Self {
            config,
            button,
            led,
        })
    }

    /// Entschärft den Edge-Latch und gibt alle Pins an den Treiber zurück
    pub fn release(self, driver: &mut G) {
        let Self {
            mut button, led, ..
        } = self;
        button.disarm_edge();
        driver.release_input(button);
        if let Some(led) = led {
            driver.release_output(led);
        }
    }

    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    pub fn read_level(&mut self) -> Result<Level, GpioError> {
        self.button.level()
    }

    /// `true` (und Latch gelöscht) wenn seit der letzten Abfrage eine Flanke kam
    pub fn poll_edge_latch(&mut self) -> Result<bool, GpioError> {
        self.button.take_edge()
    }

    /// `true` wenn der aktuelle Pegel "gedrückt" bedeutet
    pub fn is_active(&mut self) -> Result<bool, GpioError> {
        Ok(self.read_level()? == self.config.button.polarity.active_level())
    }

    pub fn has_led(&self) -> bool {
        self.led.is_some()
    }

    /// Schreibt den LED-Pegel; ohne LED ein No-op
    pub fn write_led(&mut self, level: Level) -> Result<(), GpioError> {
        match self.led.as_mut() {
            Some(led) => led.set_level(level),
            None => Ok(()),
        }
    }
}

/// Aktiviert Edge-Detect; "bereits aktiv" wird toleriert
fn arm_idempotent<I: ButtonInput>(input: &mut I, button: PinConfig) -> Result<(), GpioError> {
    let edge = button.polarity.press_edge();
    match input.arm_edge(edge) {
        Err(GpioError::EdgeAlreadyArmed) => {
            debug!("Edge detect on pin {} already armed, re-arming", button.pin);
            input.disarm_edge();
            match input.arm_edge(edge) {
                Ok(()) | Err(GpioError::EdgeAlreadyArmed) => Ok(()),
                Err(e) => Err(e),
            }
        }
        other => other,
    }
}
