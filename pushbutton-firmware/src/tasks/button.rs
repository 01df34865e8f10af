// Taster Task - Pollt den Taster und reagiert auf Audio/Settings-Ereignisse
use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_time::Instant;

use pushbutton_core::{
    ButtonMonitor, GpioDriver, MonitorEvent, SettingsSnapshot, TickTask, Timestamp,
};

use crate::bus::PubSubBus;
use crate::hal::EspGpio;
use crate::scheduler::TickerScheduler;
use crate::{MonitorEventReceiver, SignalPublisher};

/// Taster Task - läuft parallel zu WiFi/MQTT
///
/// # Parameter
/// - `gpio`: GPIO-Treiber (Interrupt-Handler muss bereits installiert sein)
/// - `settings`: Start-Settings aus der Build-Konfiguration
/// - `signal_publisher`: Publisher für ausgehende Signale
/// - `event_receiver`: Receiver für Audio- und Settings-Ereignisse
#[embassy_executor::task]
pub async fn button_monitor_task(
    gpio: EspGpio,
    settings: SettingsSnapshot,
    signal_publisher: SignalPublisher,
    event_receiver: MonitorEventReceiver,
) {
    let monitor = ButtonMonitor::new(gpio);
    let bus = PubSubBus::new(signal_publisher);
    button_monitor_logic(monitor, settings, bus, event_receiver).await;
}

/// Task-Logik (generisch über den GPIO-Treiber)
///
/// Wartet abwechselnd auf den nächsten Tick und auf eingehende Ereignisse.
/// Ein fehlgeschlagenes Binding wird nicht wiederholt, erst ein neuer
/// Settings-Snapshot startet den nächsten Versuch.
pub async fn button_monitor_logic<G: GpioDriver>(
    mut monitor: ButtonMonitor<G>,
    settings: SettingsSnapshot,
    mut bus: PubSubBus,
    event_receiver: MonitorEventReceiver,
) -> ! {
    let mut scheduler = TickerScheduler::new();

    info!("Button: Task started");
    if let Err(e) = monitor.initialize(&settings, &mut scheduler, &mut bus) {
        warn!("Button: Initialization failed: {}", e);
    }

    loop {
        let outcome = select(scheduler.next_tick(), event_receiver.receive()).await;
        let now = Timestamp::from_millis(Instant::now().as_millis());

        match outcome {
            Either::First(TickTask::ButtonPoll) => {
                if let Some(event) = monitor.poll(now, &mut bus) {
                    info!("Button: {} detected", event);
                }
            }
            Either::First(TickTask::Heartbeat) => {
                if monitor.heartbeat(now, &mut scheduler, &mut bus) {
                    warn!("Button: Watchdog fired, GPIO re-initialized");
                }
            }
            Either::Second(MonitorEvent::Settings(snapshot)) => {
                if let Err(e) = monitor.on_settings_changed(&snapshot, &mut scheduler, &mut bus) {
                    warn!("Button: Re-initialization failed: {}", e);
                }
            }
            Either::Second(event) => {
                if let Some(notification) = event.as_audio() {
                    monitor.on_audio(&notification);
                }
            }
        }
    }
}
