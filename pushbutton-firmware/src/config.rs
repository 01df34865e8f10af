// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

use pushbutton_core::SettingsSnapshot;

// ============================================================================
// GPIO Konfiguration
// ============================================================================

/// Start-Settings für Taster und LED
///
/// Werden zur Build-Zeit aus den Environment Variablen BUTTON_PIN,
/// BUTTON_POLARITY, LED_PIN und LED_POLARITY geladen (siehe .env.example).
/// Fehlende Werte bleiben `None` und bekommen die Defaults aus pushbutton-core.
pub fn initial_settings() -> SettingsSnapshot {
    SettingsSnapshot {
        button_pin: env_int(option_env!("BUTTON_PIN")),
        button_polarity: env_int(option_env!("BUTTON_POLARITY")),
        led_pin: env_int(option_env!("LED_PIN")),
        led_polarity: env_int(option_env!("LED_POLARITY")),
    }
}

fn env_int(value: Option<&'static str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Pins, die auf dem ESP32-C6 nicht frei sind (Bitmaske)
/// - GPIO12/13: USB-Serial-JTAG
/// - GPIO24..=27: SPI-Flash
pub const RESERVED_PINS: u32 = (1 << 12) | (1 << 13) | (0b1111 << 24);

/// Kapazität des Event-Channels (MQTT → Taster-Task)
pub const EVENT_CHANNEL_CAPACITY: usize = 4;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach einem WiFi-Fehler in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Topic für ausgehende Signale (Payload: "listen", "stop", "error.initialize")
pub const MQTT_TOPIC_REQUEST: &str = env!(
    "MQTT_TOPIC_REQUEST",
    "MQTT Topic Request nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Topic für Audio-Benachrichtigungen (Payload: {"event":"started","by":"audio:..."})
pub const MQTT_TOPIC_AUDIO: &str = env!(
    "MQTT_TOPIC_AUDIO",
    "MQTT Topic Audio nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Topic für Settings-Snapshots (Payload: {"button_pin":17,...})
pub const MQTT_TOPIC_SETTINGS: &str = env!(
    "MQTT_TOPIC_SETTINGS",
    "MQTT Topic Settings nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Reconnect Delay in Sekunden
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// TCP Keep-Alive Intervall in Sekunden
/// Ersetzt MQTT-Pings: die Verbindung wird auf TCP-Ebene überwacht
pub const MQTT_TCP_KEEP_ALIVE_SECS: u64 = 20;

/// Socket-Timeout in Sekunden (keine Antwort auf Daten oder Keep-Alive)
pub const MQTT_SOCKET_TIMEOUT_SECS: u64 = 60;

/// MQTT Buffer-Größe in Bytes
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// TCP Buffer-Größe für die MQTT-Verbindung in Bytes
pub const MQTT_TCP_BUFFER_SIZE: usize = 4096;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;
