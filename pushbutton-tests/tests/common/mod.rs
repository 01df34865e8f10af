//! Mock-Implementierungen für Host-Tests
//!
//! Alle Mocks teilen sich eine `PinBank`, damit Tests Pegel setzen und den
//! Hardware-Zustand prüfen können, während der Monitor die Handles besitzt.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use pushbutton_core::{
    ButtonInput, ButtonMonitor, Edge, GpioDriver, GpioError, LedOutput, Level, MonitorError,
    OutboundSignal, Pull, ScheduleError, Scheduler, SettingsSnapshot, SignalBus, TickTask,
    Timestamp, Timing,
};

// ============================================================================
// Mock GPIO
// ============================================================================

/// Simulierter Hardware-Zustand aller Pins
#[derive(Default)]
pub struct PinBank {
    pub levels: HashMap<u8, Level>,
    pub pulls: HashMap<u8, Pull>,
    pub armed: HashMap<u8, Edge>,
    pub latched: HashSet<u8>,
    pub claimed: HashSet<u8>,
    pub outputs: HashMap<u8, Level>,
    /// Nächster Claim auf diesem Pin schlägt fehl
    pub fail_claim: Option<(u8, GpioError)>,
    /// Alle Lesezugriffe schlagen fehl
    pub fail_reads: bool,
    /// Pins, deren nächstes `arm_edge` "bereits aktiv" meldet
    pub stale_arm: HashSet<u8>,
    pub claim_count: usize,
    pub release_count: usize,
    /// Eingänge, die mit scharfem Edge-Detect freigegeben wurden
    pub released_while_armed: usize,
}

#[derive(Clone, Default)]
pub struct MockGpio {
    pub bank: Rc<RefCell<PinBank>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setzt den Pegel; eine passende Flanke setzt den Latch
    pub fn set_level(&self, pin: u8, level: Level) {
        let mut bank = self.bank.borrow_mut();
        let previous = bank.levels.insert(pin, level);
        let edge = match (previous, level) {
            (Some(Level::High), Level::Low) => Some(Edge::Falling),
            (Some(Level::Low), Level::High) => Some(Edge::Rising),
            _ => None,
        };
        if edge.is_some() && bank.armed.get(&pin).copied() == edge {
            bank.latched.insert(pin);
        }
    }

    pub fn level(&self, pin: u8) -> Option<Level> {
        self.bank.borrow().levels.get(&pin).copied()
    }

    pub fn output(&self, pin: u8) -> Option<Level> {
        self.bank.borrow().outputs.get(&pin).copied()
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        self.bank.borrow().claimed.contains(&pin)
    }

    pub fn armed_edge(&self, pin: u8) -> Option<Edge> {
        self.bank.borrow().armed.get(&pin).copied()
    }

    pub fn pull(&self, pin: u8) -> Option<Pull> {
        self.bank.borrow().pulls.get(&pin).copied()
    }

    pub fn fail_next_claim(&self, pin: u8, error: GpioError) {
        self.bank.borrow_mut().fail_claim = Some((pin, error));
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.bank.borrow_mut().fail_reads = fail;
    }

    pub fn mark_stale_arm(&self, pin: u8) {
        self.bank.borrow_mut().stale_arm.insert(pin);
    }

    fn claim(&self, pin: u8) -> Result<(), GpioError> {
        let mut bank = self.bank.borrow_mut();
        if let Some((fail_pin, error)) = bank.fail_claim {
            if fail_pin == pin {
                bank.fail_claim = None;
                return Err(error);
            }
        }
        if !bank.claimed.insert(pin) {
            return Err(GpioError::PinClaimed);
        }
        bank.claim_count += 1;
        Ok(())
    }
}

pub struct MockInput {
    pin: u8,
    bank: Rc<RefCell<PinBank>>,
}

pub struct MockOutput {
    pin: u8,
    bank: Rc<RefCell<PinBank>>,
}

impl GpioDriver for MockGpio {
    type Input = MockInput;
    type Output = MockOutput;

    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<MockInput, GpioError> {
        self.claim(pin)?;
        let mut bank = self.bank.borrow_mut();
        bank.pulls.insert(pin, pull);
        // Ruhepegel durch den Pull-Widerstand, außer der Test hat schon einen Pegel gesetzt
        let idle = match pull {
            Pull::Up => Level::High,
            Pull::Down => Level::Low,
        };
        bank.levels.entry(pin).or_insert(idle);
        Ok(MockInput {
            pin,
            bank: Rc::clone(&self.bank),
        })
    }

    fn claim_output(&mut self, pin: u8, initial: Level) -> Result<MockOutput, GpioError> {
        self.claim(pin)?;
        self.bank.borrow_mut().outputs.insert(pin, initial);
        Ok(MockOutput {
            pin,
            bank: Rc::clone(&self.bank),
        })
    }

    fn release_input(&mut self, input: MockInput) {
        let mut bank = self.bank.borrow_mut();
        if bank.armed.contains_key(&input.pin) {
            bank.released_while_armed += 1;
        }
        bank.claimed.remove(&input.pin);
        bank.release_count += 1;
    }

    fn release_output(&mut self, output: MockOutput) {
        let mut bank = self.bank.borrow_mut();
        bank.claimed.remove(&output.pin);
        bank.release_count += 1;
    }
}

impl ButtonInput for MockInput {
    fn level(&mut self) -> Result<Level, GpioError> {
        let bank = self.bank.borrow();
        if bank.fail_reads {
            return Err(GpioError::AccessFailed);
        }
        bank.levels
            .get(&self.pin)
            .copied()
            .ok_or(GpioError::AccessFailed)
    }

    fn arm_edge(&mut self, edge: Edge) -> Result<(), GpioError> {
        let mut bank = self.bank.borrow_mut();
        if bank.stale_arm.remove(&self.pin) {
            bank.armed.insert(self.pin, edge);
            return Err(GpioError::EdgeAlreadyArmed);
        }
        if bank.armed.contains_key(&self.pin) {
            return Err(GpioError::EdgeAlreadyArmed);
        }
        bank.armed.insert(self.pin, edge);
        Ok(())
    }

    fn disarm_edge(&mut self) {
        let mut bank = self.bank.borrow_mut();
        bank.armed.remove(&self.pin);
        bank.latched.remove(&self.pin);
    }

    fn take_edge(&mut self) -> Result<bool, GpioError> {
        let mut bank = self.bank.borrow_mut();
        if bank.fail_reads {
            return Err(GpioError::AccessFailed);
        }
        Ok(bank.latched.remove(&self.pin))
    }
}

impl LedOutput for MockOutput {
    fn set_level(&mut self, level: Level) -> Result<(), GpioError> {
        self.bank.borrow_mut().outputs.insert(self.pin, level);
        Ok(())
    }
}

// ============================================================================
// Mock Scheduler
// ============================================================================

#[derive(Default)]
pub struct MockScheduler {
    pub active: Vec<(TickTask, Duration)>,
    pub schedule_calls: usize,
    pub cancel_calls: usize,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period_of(&self, task: TickTask) -> Option<Duration> {
        self.active
            .iter()
            .find(|(t, _)| *t == task)
            .map(|(_, period)| *period)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Scheduler for MockScheduler {
    fn schedule_repeating(
        &mut self,
        task: TickTask,
        period: Duration,
    ) -> Result<(), ScheduleError> {
        self.schedule_calls += 1;
        if self.period_of(task).is_some() {
            return Err(ScheduleError::AlreadyScheduled);
        }
        self.active.push((task, period));
        Ok(())
    }

    fn cancel(&mut self, task: TickTask) -> Result<(), ScheduleError> {
        self.cancel_calls += 1;
        let before = self.active.len();
        self.active.retain(|(t, _)| *t != task);
        if self.active.len() == before {
            return Err(ScheduleError::NotScheduled);
        }
        Ok(())
    }
}

// ============================================================================
// Mock Signal Bus
// ============================================================================

#[derive(Default)]
pub struct MockBus {
    pub emitted: Vec<OutboundSignal>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, signal: OutboundSignal) -> usize {
        self.emitted.iter().filter(|s| **s == signal).count()
    }
}

impl SignalBus for MockBus {
    fn emit(&mut self, signal: OutboundSignal) {
        self.emitted.push(signal);
    }
}

// ============================================================================
// Test-Rig
// ============================================================================

pub const BUTTON_PIN: u8 = 17;
pub const LED_PIN: u8 = 27;
pub const POLL_MS: u64 = 100;

pub fn settings(button_polarity: i64, led_polarity: i64) -> SettingsSnapshot {
    SettingsSnapshot {
        button_pin: Some(BUTTON_PIN as i64),
        button_polarity: Some(button_polarity),
        led_pin: Some(LED_PIN as i64),
        led_polarity: Some(led_polarity),
    }
}

/// Monitor mit Mocks und simulierter Uhr
pub struct Rig {
    pub gpio: MockGpio,
    pub monitor: ButtonMonitor<MockGpio>,
    pub scheduler: MockScheduler,
    pub bus: MockBus,
    pub now: u64,
    pub active_level: Level,
}

impl Rig {
    /// Initialisierter Monitor, active-low Taster, active-high LED
    pub fn new() -> Self {
        Self::with_settings(settings(0, 1))
    }

    pub fn with_settings(snapshot: SettingsSnapshot) -> Self {
        let mut rig = Self::uninitialized();
        if snapshot.button_polarity == Some(1) {
            rig.active_level = Level::High;
        }
        rig.initialize(&snapshot).expect("initialize");
        rig
    }

    pub fn uninitialized() -> Self {
        let gpio = MockGpio::new();
        let monitor = ButtonMonitor::with_timing(gpio.clone(), Timing::default());
        Self {
            gpio,
            monitor,
            scheduler: MockScheduler::new(),
            bus: MockBus::new(),
            now: 0,
            active_level: Level::Low,
        }
    }

    pub fn press(&self) {
        self.gpio.set_level(BUTTON_PIN, self.active_level);
    }

    pub fn release(&self) {
        self.gpio.set_level(BUTTON_PIN, self.active_level.inverted());
    }

    pub fn initialize(&mut self, snapshot: &SettingsSnapshot) -> Result<(), MonitorError> {
        let (scheduler, bus) = (&mut self.scheduler, &mut self.bus);
        self.monitor.initialize(snapshot, scheduler, bus)
    }

    pub fn settings_changed(&mut self, snapshot: &SettingsSnapshot) -> Result<(), MonitorError> {
        let (scheduler, bus) = (&mut self.scheduler, &mut self.bus);
        self.monitor.on_settings_changed(snapshot, scheduler, bus)
    }

    pub fn reinit(&mut self) -> Result<(), MonitorError> {
        self.monitor.reinit(&mut self.scheduler, &mut self.bus)
    }

    pub fn poll(&mut self) -> Option<pushbutton_core::ButtonEvent> {
        let now = Timestamp::from_millis(self.now);
        self.monitor.poll(now, &mut self.bus)
    }

    pub fn advance(&mut self, millis: u64) {
        self.now += millis;
    }

    /// Nächster 100-ms-Tick
    pub fn tick(&mut self) -> Option<pushbutton_core::ButtonEvent> {
        self.advance(POLL_MS);
        self.poll()
    }

    pub fn heartbeat(&mut self) -> bool {
        let now = Timestamp::from_millis(self.now);
        let (scheduler, bus) = (&mut self.scheduler, &mut self.bus);
        self.monitor.heartbeat(now, scheduler, bus)
    }

    /// Drückt am aktuellen Tick, hält `held_ms` (Vielfaches von 100) und lässt los
    pub fn press_cycle(&mut self, held_ms: u64) {
        self.press();
        self.poll();
        let ticks = held_ms / POLL_MS;
        for k in 1..=ticks {
            self.advance(POLL_MS);
            if k == ticks {
                self.release();
            }
            self.poll();
        }
        self.tick();
    }
}
