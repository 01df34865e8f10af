//! Taster-Monitor: Zustandsautomat für kurze und lange Tastendrücke
//!
//! Wird vom Host alle 100 ms abgefragt (`poll`) und jede Sekunde vom
//! Watchdog geprüft (`heartbeat`). Schwellen werden immer über die
//! vergangene Uhrzeit verglichen, nie über die Anzahl Ticks.

use core::time::Duration;

use crate::binding::{BindError, GpioBinding};
use crate::config::{ConfigError, MonitorConfig, Timing};
use crate::led;
use crate::traits::{GpioDriver, GpioError, ScheduleError, Scheduler, SettingsSource, SignalBus};
use crate::types::{AudioEvent, AudioNotification, ButtonEvent, OutboundSignal, TickTask, Timestamp};
use crate::watchdog::Watchdog;

/// Phase des Zustandsautomaten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressPhase {
    #[default]
    Idle,
    /// Druck erkannt, Schwelle noch nicht erreicht
    PressConfirmed { since: Timestamp },
    /// Langer Druck gemeldet, warte auf Loslassen
    LongPressHolding { since: Timestamp },
}

/// Eine Abtastung des Tasters pro Tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Pegel entspricht der aktiven Polarität
    pub active: bool,
    /// Edge-Latch war seit dem letzten Tick gesetzt
    pub edge: bool,
}

/// Zustand des Tasters
///
/// Gehört exklusiv dem Monitor und ändert sich nur in `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    phase: PressPhase,
}

impl ButtonState {
    pub const fn new() -> Self {
        Self {
            phase: PressPhase::Idle,
        }
    }

    pub fn phase(&self) -> PressPhase {
        self.phase
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.phase, PressPhase::Idle)
    }

    /// Langer Druck schon gemeldet, Loslassen steht aus
    pub fn awaiting_release(&self) -> bool {
        matches!(self.phase, PressPhase::LongPressHolding { .. })
    }

    pub fn press_started_at(&self) -> Option<Timestamp> {
        match self.phase {
            PressPhase::Idle => None,
            PressPhase::PressConfirmed { since } | PressPhase::LongPressHolding { since } => {
                Some(since)
            }
        }
    }

    /// Zurück auf `Idle`, laufender Druck wird verworfen
    pub fn reset(&mut self) {
        self.phase = PressPhase::Idle;
    }

    /// Ein Schritt des Automaten
    ///
    /// Gibt `Some` zurück, wenn in diesem Tick ein Signal fällig ist.
    /// `held >= threshold` ist immer ein langer Druck, auch wenn das
    /// Loslassen im selben Tick beobachtet wird.
    pub fn step(
        &mut self,
        sample: Sample,
        now: Timestamp,
        threshold: Duration,
    ) -> Option<ButtonEvent> {
        match self.phase {
            PressPhase::Idle => {
                if sample.edge || sample.active {
                    self.phase = PressPhase::PressConfirmed { since: now };
                    info!("Detected pushbutton press");
                }
                None
            }
            PressPhase::PressConfirmed { since } => {
                let is_long = now.duration_since(since) >= threshold;
                if !sample.active {
                    self.phase = PressPhase::Idle;
                    if is_long {
                        info!("Pushbutton released (long press)");
                        Some(ButtonEvent::LongPress)
                    } else {
                        info!("Pushbutton released (short press)");
                        Some(ButtonEvent::ShortPress)
                    }
                } else if is_long {
                    self.phase = PressPhase::LongPressHolding { since };
                    info!("Long press detected, waiting for release");
                    Some(ButtonEvent::LongPress)
                } else {
                    None
                }
            }
            PressPhase::LongPressHolding { .. } => {
                if !sample.active {
                    self.phase = PressPhase::Idle;
                    info!("Pushbutton finally released (long press)");
                }
                None
            }
        }
    }
}

/// Fehler beim (Re-)Initialisieren des Monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorError {
    Config(ConfigError),
    Bind(BindError),
}

impl From<ConfigError> for MonitorError {
    fn from(e: ConfigError) -> Self {
        MonitorError::Config(e)
    }
}

impl From<BindError> for MonitorError {
    fn from(e: BindError) -> Self {
        MonitorError::Bind(e)
    }
}

/// Taster-Monitor mit GPIO Binding, Watchdog und LED-Follower
///
/// # Trait-basierte Abstraktion
/// Der generische Parameter `G: GpioDriver` ermöglicht:
/// - Real Hardware (`EspGpio`) im Production-Code
/// - Mock Implementation in den Tests
pub struct ButtonMonitor<G: GpioDriver> {
    driver: G,
    timing: Timing,
    watchdog: Watchdog,
    config: Option<MonitorConfig>,
    binding: Option<GpioBinding<G>>,
    state: ButtonState,
}

impl<G: GpioDriver> ButtonMonitor<G> {
    pub fn new(driver: G) -> Self {
        Self::with_timing(driver, Timing::default())
    }

    pub fn with_timing(driver: G, timing: Timing) -> Self {
        Self {
            driver,
            timing,
            watchdog: Watchdog::new(&timing),
            config: None,
            binding: None,
            state: ButtonState::new(),
        }
    }

    /// Liest die Settings und startet den Monitor
    ///
    /// # Fehlerbehandlung
    /// - Ungültiger Taster: Monitor startet nicht, keine Ticks registriert
    /// - Hardware-Fehler: Ticks entfernt, einmalig `CannotInitialize` gesendet
    pub fn initialize<S, Sch, B>(
        &mut self,
        settings: &S,
        scheduler: &mut Sch,
        bus: &mut B,
    ) -> Result<(), MonitorError>
    where
        S: SettingsSource + ?Sized,
        Sch: Scheduler,
        B: SignalBus,
    {
        let config = match MonitorConfig::from_settings(settings) {
            Ok(config) => config,
            Err(e) => {
                warn!("Invalid button GPIO configuration, monitor not started");
                self.shutdown(scheduler);
                return Err(e.into());
            }
        };
        self.config = Some(config);
        self.reinit(scheduler, bus)
    }

    /// Settings haben sich geändert: immer komplette Neu-Initialisierung
    pub fn on_settings_changed<S, Sch, B>(
        &mut self,
        settings: &S,
        scheduler: &mut Sch,
        bus: &mut B,
    ) -> Result<(), MonitorError>
    where
        S: SettingsSource + ?Sized,
        Sch: Scheduler,
        B: SignalBus,
    {
        info!("Settings changed, re-initializing");
        self.initialize(settings, scheduler, bus)
    }

    /// Setzt den Zustand zurück und baut das GPIO Binding neu auf
    ///
    /// Reihenfolge: erst `ButtonState`, dann altes Binding freigeben,
    /// dann neues Binding und Ticks (cancel-then-reschedule).
    pub fn reinit<Sch, B>(&mut self, scheduler: &mut Sch, bus: &mut B) -> Result<(), MonitorError>
    where
        Sch: Scheduler,
        B: SignalBus,
    {
        self.state.reset();
        if let Some(old) = self.binding.take() {
            old.release(&mut self.driver);
        }

        let config = self.config.ok_or(ConfigError::ButtonPinMissing)?;

        match GpioBinding::bind(&mut self.driver, config) {
            Ok(binding) => {
                self.binding = Some(binding);
                reschedule(scheduler, TickTask::ButtonPoll, self.timing.poll_period);
                reschedule(scheduler, TickTask::Heartbeat, self.timing.heartbeat_period);
                info!("GPIO initialised, monitor running");
                Ok(())
            }
            Err(e) => {
                warn!("Can't initialize GPIO - monitor disabled: {}", e);
                unschedule(scheduler, TickTask::ButtonPoll);
                unschedule(scheduler, TickTask::Heartbeat);
                bus.emit(OutboundSignal::CannotInitialize);
                Err(e.into())
            }
        }
    }

    /// Stoppt den Monitor: Binding freigeben, Ticks entfernen
    pub fn shutdown<Sch: Scheduler>(&mut self, scheduler: &mut Sch) {
        self.state.reset();
        self.config = None;
        if let Some(old) = self.binding.take() {
            old.release(&mut self.driver);
        }
        unschedule(scheduler, TickTask::ButtonPoll);
        unschedule(scheduler, TickTask::Heartbeat);
    }

    /// Taster-Tick (0.1 s)
    ///
    /// Fehler beim Lesen werden geloggt, der Tick bleibt dann ohne Wirkung.
    pub fn poll<B: SignalBus>(&mut self, now: Timestamp, bus: &mut B) -> Option<ButtonEvent> {
        let binding = self.binding.as_mut()?;

        let sample = match sample_button(binding) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Button poll failed, tick skipped: {}", e);
                return None;
            }
        };

        let event = self
            .state
            .step(sample, now, self.timing.longpress_threshold)?;
        bus.emit(event.signal());
        Some(event)
    }

    /// Watchdog-Tick (1 s)
    ///
    /// Gibt `true` zurück, wenn der Watchdog ausgelöst hat.
    pub fn heartbeat<Sch, B>(&mut self, now: Timestamp, scheduler: &mut Sch, bus: &mut B) -> bool
    where
        Sch: Scheduler,
        B: SignalBus,
    {
        if !self.watchdog.is_stuck(&self.state, now) {
            return false;
        }

        warn!("Something went wrong with the pushbutton, resetting GPIO");
        if let Err(e) = self.reinit(scheduler, bus) {
            warn!("Watchdog re-init failed: {}", e);
        }
        bus.emit(OutboundSignal::RequestStop);
        true
    }

    /// Audio gestartet → LED an
    pub fn on_external_start(&mut self) {
        led::follow(self.binding.as_mut(), AudioEvent::Started);
    }

    /// Audio gestoppt → LED aus
    pub fn on_external_stop(&mut self) {
        led::follow(self.binding.as_mut(), AudioEvent::Stopped);
    }

    /// Eingehende Audio-Benachrichtigung (alle Quellen werden akzeptiert)
    pub fn on_audio(&mut self, notification: &AudioNotification<'_>) {
        info!(
            "Audio {} detected (by '{}')",
            notification.event, notification.source
        );
        match notification.event {
            AudioEvent::Started => self.on_external_start(),
            AudioEvent::Stopped => self.on_external_stop(),
        }
    }

    pub fn state(&self) -> &ButtonState {
        &self.state
    }

    pub fn config(&self) -> Option<MonitorConfig> {
        self.config
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// `true` solange ein Binding aktiv ist
    pub fn is_running(&self) -> bool {
        self.binding.is_some()
    }

    pub fn driver(&self) -> &G {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut G {
        &mut self.driver
    }
}

fn sample_button<G: GpioDriver>(binding: &mut GpioBinding<G>) -> Result<Sample, GpioError> {
    let active = binding.is_active()?;
    // Latch wird in jedem Tick gelesen, damit Prellen während eines Drucks
    // nach dem Loslassen keinen neuen Druck auslöst
    let edge = binding.poll_edge_latch()?;
    Ok(Sample { active, edge })
}

fn reschedule<Sch: Scheduler>(scheduler: &mut Sch, task: TickTask, period: Duration) {
    unschedule(scheduler, task);
    if let Err(e) = scheduler.schedule_repeating(task, period) {
        warn!("Could not schedule {}: {}", task, e);
    }
}

fn unschedule<Sch: Scheduler>(scheduler: &mut Sch, task: TickTask) {
    match scheduler.cancel(task) {
        Ok(()) | Err(ScheduleError::NotScheduled) => {}
        Err(e) => warn!("Could not cancel {}: {}", task, e),
    }
}
