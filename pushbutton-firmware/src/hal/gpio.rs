// GPIO Treiber für den Taster-Monitor
//
// Implementiert pushbutton_core::GpioDriver auf dem ESP32-C6.
// Pins werden zur Laufzeit per Nummer belegt (Settings können sich ändern),
// der Edge-Latch wird im GPIO-Interrupt gesetzt und beim Pollen gelöscht.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use esp_hal::gpio::{
    AnyPin, Event, Input, InputConfig, Io, Level as HalLevel, Output, OutputConfig, Pull as HalPull,
};
use esp_hal::handler;

use pushbutton_core::{ButtonInput, Edge, GpioDriver, GpioError, LedOutput, Level, Pull};

use crate::config::RESERVED_PINS;

/// Taster-Eingang (Zugriff aus Task und Interrupt)
static BUTTON: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));

/// Hardware-Edge-Latch: vom Interrupt gesetzt, von `take_edge()` gelöscht
static EDGE_LATCH: AtomicBool = AtomicBool::new(false);

/// Edge-Detect aktiv
static EDGE_ARMED: AtomicBool = AtomicBool::new(false);

/// Interrupt-Handler installiert
static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installiert den GPIO-Interrupt-Handler
///
/// Muss vor dem ersten Binding aufgerufen werden, sonst liefert
/// `claim_input()` `GpioError::DriverMissing`.
pub fn install_edge_handler(io: &mut Io<'_>) {
    io.set_interrupt_handler(gpio_edge_handler);
    HANDLER_INSTALLED.store(true, Ordering::Release);
}

#[handler]
fn gpio_edge_handler() {
    critical_section::with(|cs| {
        if let Some(button) = BUTTON.borrow_ref_mut(cs).as_mut() {
            if button.is_interrupt_set() {
                button.clear_interrupt();
                EDGE_LATCH.store(true, Ordering::Release);
            }
        }
    });
}

/// Real Hardware GPIO-Treiber
///
/// Merkt sich belegte Pins als Bitmaske.
pub struct EspGpio {
    claimed: u32,
}

impl EspGpio {
    pub fn new() -> Self {
        Self { claimed: 0 }
    }

    fn claim(&mut self, pin: u8) -> Result<AnyPin<'static>, GpioError> {
        let mask = 1u32 << pin;
        if RESERVED_PINS & mask != 0 {
            return Err(GpioError::InvalidMode);
        }
        if self.claimed & mask != 0 {
            return Err(GpioError::PinClaimed);
        }
        self.claimed |= mask;
        // SAFETY: Pin ist nicht reserviert und wird von keinem anderen Treiber genutzt,
        // die Bitmaske verhindert doppelte Belegung
        Ok(unsafe { AnyPin::steal(pin) })
    }

    fn unclaim(&mut self, pin: u8) {
        self.claimed &= !(1u32 << pin);
    }
}

impl Default for EspGpio {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle auf den Taster (das `Input` selbst liegt in `BUTTON`)
pub struct EspButton {
    pin: u8,
}

/// LED-Ausgang
pub struct EspLed {
    pin: u8,
    output: Output<'static>,
}

impl GpioDriver for EspGpio {
    type Input = EspButton;
    type Output = EspLed;

    fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<EspButton, GpioError> {
        if !HANDLER_INSTALLED.load(Ordering::Acquire) {
            return Err(GpioError::DriverMissing);
        }
        let occupied = critical_section::with(|cs| BUTTON.borrow_ref(cs).is_some());
        if occupied {
            return Err(GpioError::PinClaimed);
        }

        let any_pin = self.claim(pin)?;
        let pull = match pull {
            Pull::Up => HalPull::Up,
            Pull::Down => HalPull::Down,
        };
        let input = Input::new(any_pin, InputConfig::default().with_pull(pull));

        EDGE_LATCH.store(false, Ordering::Release);
        critical_section::with(|cs| BUTTON.borrow_ref_mut(cs).replace(input));
        Ok(EspButton { pin })
    }

    fn claim_output(&mut self, pin: u8, initial: Level) -> Result<EspLed, GpioError> {
        let any_pin = self.claim(pin)?;
        let output = Output::new(any_pin, to_hal(initial), OutputConfig::default());
        Ok(EspLed { pin, output })
    }

    fn release_input(&mut self, input: EspButton) {
        // Input droppen → Pin wird zurückgesetzt
        critical_section::with(|cs| BUTTON.borrow_ref_mut(cs).take());
        EDGE_LATCH.store(false, Ordering::Release);
        self.unclaim(input.pin);
    }

    fn release_output(&mut self, output: EspLed) {
        let EspLed { pin, output } = output;
        drop(output);
        self.unclaim(pin);
    }
}

impl ButtonInput for EspButton {
    fn level(&mut self) -> Result<Level, GpioError> {
        critical_section::with(|cs| {
            BUTTON
                .borrow_ref(cs)
                .as_ref()
                .map(|input| Level::from(input.is_high()))
                .ok_or(GpioError::AccessFailed)
        })
    }

    fn arm_edge(&mut self, edge: Edge) -> Result<(), GpioError> {
        if EDGE_ARMED.load(Ordering::Acquire) {
            return Err(GpioError::EdgeAlreadyArmed);
        }
        let event = match edge {
            Edge::Falling => Event::FallingEdge,
            Edge::Rising => Event::RisingEdge,
        };
        critical_section::with(|cs| {
            let mut button = BUTTON.borrow_ref_mut(cs);
            let input = button.as_mut().ok_or(GpioError::AccessFailed)?;
            input.clear_interrupt();
            input.listen(event);
            Ok(())
        })?;
        EDGE_ARMED.store(true, Ordering::Release);
        Ok(())
    }

    fn disarm_edge(&mut self) {
        critical_section::with(|cs| {
            if let Some(input) = BUTTON.borrow_ref_mut(cs).as_mut() {
                input.unlisten();
                input.clear_interrupt();
            }
        });
        EDGE_ARMED.store(false, Ordering::Release);
        EDGE_LATCH.store(false, Ordering::Release);
    }

    fn take_edge(&mut self) -> Result<bool, GpioError> {
        Ok(EDGE_LATCH.swap(false, Ordering::AcqRel))
    }
}

impl LedOutput for EspLed {
    fn set_level(&mut self, level: Level) -> Result<(), GpioError> {
        self.output.set_level(to_hal(level));
        Ok(())
    }
}

fn to_hal(level: Level) -> HalLevel {
    match level {
        Level::Low => HalLevel::Low,
        Level::High => HalLevel::High,
    }
}
