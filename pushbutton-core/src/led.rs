//! LED-Follower
//!
//! Spiegelt den externen Audio-Zustand auf die LED. Kein eigener Zustand.

use crate::binding::GpioBinding;
use crate::traits::GpioDriver;
use crate::types::AudioEvent;

/// Setzt die LED passend zu `event`
///
/// Gestartet → An-Pegel (`polarity`), gestoppt → Aus-Pegel (`1 - polarity`).
/// Ohne Binding oder ohne LED passiert nichts.
pub fn follow<G: GpioDriver>(binding: Option<&mut GpioBinding<G>>, event: AudioEvent) {
    let Some(binding) = binding else {
        return;
    };
    let Some(led) = binding.config().led else {
        return;
    };

    let level = match event {
        AudioEvent::Started => led.polarity.active_level(),
        AudioEvent::Stopped => led.polarity.inactive_level(),
    };

    match binding.write_led(level) {
        Ok(()) => debug!("LED on pin {} set to {}", led.pin, level),
        Err(e) => error!("Failed to write LED on pin {}: {}", led.pin, e),
    }
}
