// WiFi Tasks - Station-Modus, Netzwerk-Stack und DHCP-Log
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// WiFi Connection Task
///
/// Startet den Controller im Station-Modus, verbindet mit dem AP
/// und verbindet nach einem Disconnect automatisch neu.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Connection task started");
    let retry_delay = Duration::from_secs(WIFI_RETRY_DELAY_SECS);

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            let mode = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );

            if let Err(e) = controller.set_config(&mode) {
                error!("WiFi: Invalid configuration: {}", Debug2Format(&e));
                Timer::after(retry_delay).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                error!("WiFi: Start failed: {}", Debug2Format(&e));
                Timer::after(retry_delay).await;
                continue;
            }
            info!("WiFi: Controller started");
        }

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        if let Err(e) = controller.connect_async().await {
            error!("WiFi: Connect failed: {}", Debug2Format(&e));
            Timer::after(retry_delay).await;
            continue;
        }
        info!("WiFi: Connected");

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!(
            "WiFi: Connection lost, reconnecting in {}s",
            WIFI_RETRY_DELAY_SECS
        );
        Timer::after(retry_delay).await;
    }
}

/// Network Task - treibt den embassy-net Stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Task
///
/// Wartet auf Link + IP-Adresse und loggt die Konfiguration einmalig
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
    }
}
