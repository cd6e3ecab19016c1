//! MQTT broker adapter.
//!
//! Implements [`MessagingPort`] on top of an existing client library:
//! `esp-idf-svc`'s MQTT client on the device, `rumqttc` on a host build.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` (see `esp_impl`).
//! - **all other targets**: `rumqttc` sync client against a real broker.
//!
//! ## Session model
//!
//! Both clients hand back a connection object that has to be driven
//! continuously.  Each `connect()` spawns an `mqtt-rx` thread that owns it,
//! flips the shared `connected` flag on CONNACK / disconnect, and forwards
//! complete publishes over an mpsc channel.  `poll_inbound()` only does a
//! `try_recv`, so the main loop never blocks on the socket.
//!
//! Reconnecting is left to the supervisor: `connect()` always tears down
//! the previous session and opens a fresh one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::app::model::DeviceIdentity;
use crate::app::ports::{InboundMessage, MessagingPort, TransportError};
use crate::config::NodeConfig;

#[cfg(target_os = "espidf")]
mod esp_impl;
#[cfg(target_os = "espidf")]
use esp_impl as platform;

#[cfg(not(target_os = "espidf"))]
use host as platform;
#[cfg(not(target_os = "espidf"))]
pub use host::{RxFlow, route_event};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

/// How long `connect()` waits for CONNACK.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_POLL: Duration = Duration::from_millis(50);

/// Publishes larger than this are dropped by the receiver thread.
pub const MAX_INBOUND_PAYLOAD: usize = 1024;

const RX_THREAD_STACK: usize = 8 * 1024;

// ───────────────────────────────────────────────────────────────
// Settings
// ───────────────────────────────────────────────────────────────

/// Broker endpoint and session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keepalive_secs: u16,
}

impl MqttSettings {
    pub fn from_config(config: &NodeConfig, identity: &DeviceIdentity) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            client_id: identity.client_id.clone(),
            username: non_empty(&config.mqtt_user),
            password: non_empty(&config.mqtt_password),
            keepalive_secs: config.mqtt_keepalive_secs,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

/// One broker session: the client handle plus what the receiver thread
/// shares with it.
struct Session {
    client: platform::Client,
    inbound: Receiver<InboundMessage>,
    connected: Arc<AtomicBool>,
}

impl Session {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn wait_connected(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if self.is_connected() {
                return true;
            }
            std::thread::sleep(CONNECT_POLL);
        }
        self.is_connected()
    }
}

fn accept_payload(topic: &str, len: usize) -> bool {
    if len > MAX_INBOUND_PAYLOAD {
        warn!(
            "MQTT: dropping oversized payload on '{}' ({} bytes)",
            topic, len
        );
        return false;
    }
    true
}

// ───────────────────────────────────────────────────────────────
// MqttAdapter
// ───────────────────────────────────────────────────────────────

pub struct MqttAdapter {
    settings: MqttSettings,
    session: Option<Session>,
}

impl MqttAdapter {
    pub fn new(settings: MqttSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            platform::close(&mut session.client);
        }
    }

    fn live_session(&mut self) -> Result<&mut Session, TransportError> {
        match self.session.as_mut() {
            Some(s) if s.is_connected() => Ok(s),
            _ => Err(TransportError::NotConnected),
        }
    }
}

impl Drop for MqttAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

impl MessagingPort for MqttAdapter {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.close();
        info!(
            "MQTT: connecting to {}:{} as '{}'",
            self.settings.host, self.settings.port, self.settings.client_id
        );

        let mut session = platform::open(&self.settings)?;
        if !session.wait_connected(CONNECT_TIMEOUT) {
            warn!(
                "MQTT: no CONNACK within {} s",
                CONNECT_TIMEOUT.as_secs()
            );
            platform::close(&mut session.client);
            return Err(TransportError::ConnectFailed);
        }

        info!("MQTT: connected");
        self.session = Some(session);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.session.is_some() {
            self.close();
            info!("MQTT: disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_connected)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        let session = self.live_session()?;
        platform::subscribe(&mut session.client, topic)?;
        info!("MQTT: subscribed to '{}'", topic);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        let session = self.live_session()?;
        platform::publish(&mut session.client, topic, payload)
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        let session = self.session.as_ref()?;
        match session.inbound.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host platform (rumqttc)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Sender};
    use std::time::Duration;

    use log::{info, warn};
    use rumqttc::{Connection, Event, MqttOptions, Packet, QoS};

    use super::{MqttSettings, RX_THREAD_STACK, Session, accept_payload};
    use crate::app::ports::{InboundMessage, TransportError};

    pub(super) type Client = rumqttc::Client;

    /// Outgoing request queue depth.
    const REQUEST_CAPACITY: usize = 16;

    /// rumqttc refuses keep-alive intervals below this.
    const MIN_KEEPALIVE_SECS: u16 = 5;

    pub(super) fn open(settings: &MqttSettings) -> Result<Session, TransportError> {
        let mut options = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        options.set_keep_alive(Duration::from_secs(u64::from(
            settings.keepalive_secs.max(MIN_KEEPALIVE_SECS),
        )));
        options.set_clean_session(true);
        if let Some(user) = &settings.username {
            options.set_credentials(user, settings.password.as_deref().unwrap_or(""));
        }

        let (client, connection) = rumqttc::Client::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let (tx, inbound) = mpsc::channel();

        let flag = Arc::clone(&connected);
        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(RX_THREAD_STACK)
            .spawn(move || receive_loop(connection, &tx, &flag))
            .map_err(|e| {
                warn!("MQTT: receiver thread spawn failed: {}", e);
                TransportError::ConnectFailed
            })?;

        Ok(Session {
            client,
            inbound,
            connected,
        })
    }

    /// Whether the receiver thread keeps driving the connection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RxFlow {
        Continue,
        Stop,
    }

    /// Apply one connection event to the session state: CONNACK raises the
    /// `connected` flag, a broker DISCONNECT clears it, and publishes within
    /// [`MAX_INBOUND_PAYLOAD`](super::MAX_INBOUND_PAYLOAD) go to `tx`.
    pub fn route_event(
        event: Event,
        tx: &Sender<InboundMessage>,
        connected: &AtomicBool,
    ) -> RxFlow {
        match event {
            Event::Incoming(Packet::ConnAck(_)) => {
                connected.store(true, Ordering::Release);
            }
            Event::Incoming(Packet::Publish(p)) => {
                if !accept_payload(&p.topic, p.payload.len()) {
                    return RxFlow::Continue;
                }
                let msg = InboundMessage {
                    topic: p.topic,
                    payload: p.payload.to_vec(),
                };
                if tx.send(msg).is_err() {
                    return RxFlow::Stop;
                }
            }
            Event::Incoming(Packet::Disconnect) => {
                info!("MQTT: broker sent DISCONNECT");
                connected.store(false, Ordering::Release);
                return RxFlow::Stop;
            }
            _ => {}
        }
        RxFlow::Continue
    }

    /// Drive the connection until it errors or the adapter goes away.
    /// rumqttc would reconnect on the next iteration; stopping here leaves
    /// that decision to the supervisor.
    fn receive_loop(mut connection: Connection, tx: &Sender<InboundMessage>, connected: &AtomicBool) {
        for notification in connection.iter() {
            match notification {
                Ok(event) => {
                    if route_event(event, tx, connected) == RxFlow::Stop {
                        break;
                    }
                }
                Err(e) => {
                    warn!("MQTT: connection error: {}", e);
                    break;
                }
            }
        }
        connected.store(false, Ordering::Release);
    }

    pub(super) fn subscribe(client: &mut Client, topic: &str) -> Result<(), TransportError> {
        client.try_subscribe(topic, QoS::AtMostOnce).map_err(|e| {
            warn!("MQTT: subscribe '{}' failed: {}", topic, e);
            TransportError::SubscribeFailed
        })
    }

    pub(super) fn publish(
        client: &mut Client,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        client
            .try_publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .map_err(|e| {
                warn!("MQTT: publish '{}' failed: {}", topic, e);
                TransportError::PublishFailed
            })
    }

    pub(super) fn close(client: &mut Client) {
        // Fails only when the receiver thread is already gone.
        let _ = client.try_disconnect();
    }
}
