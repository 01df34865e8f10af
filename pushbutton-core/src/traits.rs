//! Hardware- und Host-Abstraktionen
//!
//! Diese Traits definieren die Schnittstellen, über die der Monitor mit
//! Hardware und Host-Laufzeit spricht, ohne konkrete Implementierung.
//!
//! # Implementierungen
//! - **Production:** `EspGpio`, `TickerScheduler`, `PubSubBus` (pushbutton-firmware)
//! - **Testing:** Mocks in pushbutton-tests

use core::time::Duration;

use crate::types::{Edge, Level, OutboundSignal, Pull, TickTask};

/// Fehler-Typ für GPIO-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Pin ist bereits belegt
    PinClaimed,
    /// Pin unterstützt den Modus nicht (z.B. Flash-Pin)
    InvalidMode,
    /// GPIO-Treiber bzw. Interrupt-Handler fehlt
    DriverMissing,
    /// Edge-Detect ist schon aktiv
    EdgeAlreadyArmed,
    /// Pegel konnte nicht gelesen/geschrieben werden
    AccessFailed,
}

/// Trait für den GPIO-Treiber
///
/// Vergibt Pins als Handles und nimmt sie wieder zurück.
pub trait GpioDriver {
    type Input: ButtonInput;
    type Output: LedOutput;

    /// Konfiguriert `pin` als Eingang mit Pull-Widerstand
    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<Self::Input, GpioError>;

    /// Konfiguriert `pin` als Ausgang mit Startpegel `initial`
    fn claim_output(&mut self, pin: u8, initial: Level) -> Result<Self::Output, GpioError>;

    /// Gibt einen Eingang frei (Edge-Detect muss vorher entschärft sein)
    fn release_input(&mut self, input: Self::Input);

    /// Gibt einen Ausgang frei
    fn release_output(&mut self, output: Self::Output);
}

/// Taster-Eingang mit Hardware-Edge-Latch
pub trait ButtonInput {
    /// Aktueller Pegel
    fn level(&mut self) -> Result<Level, GpioError>;

    /// Aktiviert Edge-Detect für `edge`
    ///
    /// # Fehlerbehandlung
    /// `GpioError::EdgeAlreadyArmed` wenn bereits aktiv
    fn arm_edge(&mut self, edge: Edge) -> Result<(), GpioError>;

    /// Deaktiviert Edge-Detect (auch wenn nicht aktiv)
    fn disarm_edge(&mut self);

    /// `true` wenn seit dem letzten Aufruf eine Flanke kam; setzt den Latch zurück
    fn take_edge(&mut self) -> Result<bool, GpioError>;
}

/// LED-Ausgang
pub trait LedOutput {
    fn set_level(&mut self, level: Level) -> Result<(), GpioError>;
}

/// Fehler-Typ für den Scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    AlreadyScheduled,
    NotScheduled,
}

/// Trait für den periodischen Host-Scheduler
pub trait Scheduler {
    /// Registriert einen wiederkehrenden Tick
    fn schedule_repeating(&mut self, task: TickTask, period: Duration)
    -> Result<(), ScheduleError>;

    /// Entfernt einen Tick
    fn cancel(&mut self, task: TickTask) -> Result<(), ScheduleError>;
}

/// Trait für den Message-Bus (ausgehende Signale)
pub trait SignalBus {
    fn emit(&mut self, signal: OutboundSignal);
}

/// Trait für den (read-only) Settings-Snapshot
pub trait SettingsSource {
    fn get_int(&self, key: &str) -> Option<i64>;
}
