//! Integration Tests für den LED-Follower
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockGpio

mod common;

use common::{BUTTON_PIN, LED_PIN, Rig, settings};
use pushbutton_core::{AudioEvent, AudioNotification, GpioError, Level, SettingsSnapshot};

// ============================================================================
// Tests: Start / Stop
// ============================================================================

#[test]
fn test_led_starts_off_active_high() {
    let rig = Rig::with_settings(settings(0, 1));
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::Low));
}

#[test]
fn test_led_starts_off_active_low() {
    let rig = Rig::with_settings(settings(0, 0));
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));
}

#[test]
fn test_start_then_stop_active_high() {
    let mut rig = Rig::with_settings(settings(0, 1));

    rig.monitor.on_external_start();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));

    rig.monitor.on_external_stop();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::Low));
}

#[test]
fn test_start_then_stop_active_low() {
    let mut rig = Rig::with_settings(settings(0, 0));

    rig.monitor.on_external_start();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::Low));

    rig.monitor.on_external_stop();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));
}

#[test]
fn test_repeated_start_is_stable() {
    let mut rig = Rig::new();
    rig.monitor.on_external_start();
    rig.monitor.on_external_start();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));
}

// ============================================================================
// Tests: Audio-Benachrichtigungen
// ============================================================================

#[test]
fn test_audio_notification_any_source() {
    let mut rig = Rig::new();

    rig.monitor.on_audio(&AudioNotification {
        event: AudioEvent::Started,
        source: "audio:vlc",
    });
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));

    // Quell-Tag wird nicht gefiltert
    rig.monitor.on_audio(&AudioNotification {
        event: AudioEvent::Stopped,
        source: "skill:timer",
    });
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::Low));

    rig.monitor.on_audio(&AudioNotification {
        event: AudioEvent::Started,
        source: "",
    });
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));
}

// ============================================================================
// Tests: No-op Fälle
// ============================================================================

#[test]
fn test_no_led_configured_is_noop() {
    let snapshot = SettingsSnapshot {
        button_pin: Some(BUTTON_PIN as i64),
        ..SettingsSnapshot::default()
    };
    let mut rig = Rig::with_settings(snapshot);

    rig.monitor.on_external_start();
    rig.monitor.on_external_stop();

    assert!(rig.gpio.bank.borrow().outputs.is_empty());
    assert!(rig.bus.emitted.is_empty());
}

#[test]
fn test_failed_binding_is_noop() {
    let mut rig = Rig::uninitialized();
    rig.gpio.fail_next_claim(BUTTON_PIN, GpioError::DriverMissing);
    let _ = rig.initialize(&settings(0, 1));

    rig.monitor.on_external_start();
    assert_eq!(rig.gpio.output(LED_PIN), None);
}

#[test]
fn test_led_follows_after_rebind() {
    let mut rig = Rig::new();
    rig.monitor.on_external_start();

    // Neues Binding startet die LED wieder im Aus-Zustand
    rig.reinit().unwrap();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::Low));

    rig.monitor.on_external_start();
    assert_eq!(rig.gpio.output(LED_PIN), Some(Level::High));
}
