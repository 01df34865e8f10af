// MQTT Task - Bridge zwischen Taster-Task und MQTT Broker
use core::cell::RefCell;

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::tcp::{self, TcpSocket};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType};
use embassy_time::{Duration, Timer, with_timeout};
use embedded_io_async::{ErrorType, Read, Write};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use pushbutton_core::MonitorEvent;

use crate::bus::{PayloadError, TOPICS, parse_message};
use crate::config::*;
use crate::{MonitorEventSender, SignalSubscriber};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Dieser Task übernimmt die komplette MQTT-Kommunikation:
/// - Wartet auf Netzwerk-Verbindung
/// - Published Signale vom Taster-Task ("listen", "stop", "error.initialize")
/// - Abonniert Audio- und Settings-Topic und leitet Ereignisse weiter
/// - Automatisches Reconnect bei Fehlern
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `signal_subscriber`: Subscriber für ausgehende Signale
/// - `event_sender`: Sender für eingehende Ereignisse
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    mut signal_subscriber: SignalSubscriber,
    event_sender: MonitorEventSender,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_connect_and_bridge(stack, &mut signal_subscriber, event_sender).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Verbindet mit dem Broker und leitet Nachrichten in beide Richtungen weiter
///
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen (TCP Keep-Alive statt MQTT-Pings)
/// 3. MQTT CONNECT + SUBSCRIBE (Audio, Settings)
/// 4. Bridge-Loop: Signale publishen, Nachrichten empfangen
///
/// Ein Empfang startet erst, wenn der Socket lesbar ist, und läuft dann
/// immer bis zum Ende des Pakets. Ein halb gelesenes Paket würde den
/// MQTT-Stream desynchronisieren.
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet automatisch einen Reconnect-Versuch.
async fn mqtt_connect_and_bridge(
    stack: &'static Stack<'static>,
    signal_subscriber: &mut SignalSubscriber,
    event_sender: MonitorEventSender,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(MQTT_SOCKET_TIMEOUT_SECS)));
    socket.set_keep_alive(Some(Duration::from_secs(MQTT_TCP_KEEP_ALIVE_SECS)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    let socket = RefCell::new(socket);

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    // 0 = kein MQTT Keep-Alive, die Verbindung überwacht TCP
    config.keep_alive = 0;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    let mut client = MqttClient::<_, 5, _>::new(
        SharedSocket { socket: &socket },
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker");

    for topic in [TOPICS.audio, TOPICS.settings] {
        client
            .subscribe_to_topic(topic)
            .await
            .map_err(|_| MqttError::SubscribeFailed)?;
        info!("MQTT: Subscribed to '{}'", topic);
    }

    // Bridge Loop
    loop {
        let outcome = select(
            wait_readable(&socket),
            signal_subscriber.next_message_pure(),
        )
        .await;

        match outcome {
            Either::First(()) => {
                let (topic, payload) = client
                    .receive_message()
                    .await
                    .map_err(|_| MqttError::ReceiveFailed)?;

                match parse_message(&TOPICS, topic, payload) {
                    Ok(event) => {
                        info!("MQTT: Received {} on '{}'", event, topic);
                        forward(event_sender, event).await;
                    }
                    Err(PayloadError::InvalidJson) => {
                        warn!("MQTT: Invalid payload on '{}', ignored", topic);
                    }
                    Err(PayloadError::UnknownTopic) => {
                        warn!("MQTT: Message on unexpected topic '{}'", topic);
                    }
                }
            }
            Either::Second(signal) => {
                info!("MQTT: Publishing '{}'", signal.as_str());
                client
                    .send_message(
                        MQTT_TOPIC_REQUEST,
                        signal.as_str().as_bytes(),
                        QualityOfService::QoS0,
                        false,
                    )
                    .await
                    .map_err(|_| MqttError::PublishFailed)?;
            }
        }
    }
}

/// Wartet bis Daten (oder EOF) im Socket liegen, ohne etwas zu lesen
#[allow(clippy::await_holding_refcell_ref)]
async fn wait_readable(socket: &RefCell<TcpSocket<'_>>) {
    socket.borrow().wait_read_ready().await
}

/// Leitet ein Ereignis an den Taster-Task weiter
///
/// Audio-Ereignisse werden bei voller Queue verworfen,
/// Settings warten auf einen freien Platz.
async fn forward(event_sender: MonitorEventSender, event: MonitorEvent) {
    if event.is_droppable() {
        if event_sender.try_send(event).is_err() {
            warn!("MQTT: Event queue full, dropping audio event");
        }
    } else {
        event_sender.send(event).await;
    }
}

/// TCP-Socket, den MQTT-Client und Bridge-Loop gemeinsam nutzen
///
/// Der Loop fragt nur die Lesbarkeit ab, während der Client nicht arbeitet.
/// Gelesen und geschrieben wird ausschließlich über den Client.
struct SharedSocket<'s, 'b> {
    socket: &'s RefCell<TcpSocket<'b>>,
}

impl ErrorType for SharedSocket<'_, '_> {
    type Error = tcp::Error;
}

#[allow(clippy::await_holding_refcell_ref)]
impl Read for SharedSocket<'_, '_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().read(buf).await
    }
}

#[allow(clippy::await_holding_refcell_ref)]
impl Write for SharedSocket<'_, '_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket.borrow_mut().flush().await
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(MqttError::DnsResolutionFailed),
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PublishFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
        }
    }
}
