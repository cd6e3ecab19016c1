//! ESP-IDF platform helpers for `MqttAdapter`.
//!
//! Compiled only for `target_os = "espidf"`.  Wraps `EspMqttClient` and
//! drives its `EspMqttConnection` on a dedicated receiver thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use log::{info, warn};

use super::{MqttSettings, RX_THREAD_STACK, Session, accept_payload};
use crate::app::ports::{InboundMessage, TransportError};

pub(super) type Client = EspMqttClient<'static>;

pub(super) fn open(settings: &MqttSettings) -> Result<Session, TransportError> {
    let url = format!("mqtt://{}:{}", settings.host, settings.port);
    let conf = MqttClientConfiguration {
        client_id: Some(settings.client_id.as_str()),
        username: settings.username.as_deref(),
        password: settings.password.as_deref(),
        keep_alive_interval: Some(Duration::from_secs(u64::from(settings.keepalive_secs))),
        ..Default::default()
    };

    let (client, connection) = EspMqttClient::new(&url, &conf).map_err(|e| {
        warn!("MQTT: client init for {} failed: {}", url, e);
        TransportError::ConnectFailed
    })?;

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

/// Runs until the client is dropped, which makes `next()` fail.
fn receive_loop(mut connection: EspMqttConnection, tx: &Sender<InboundMessage>, connected: &AtomicBool) {
    while let Ok(event) = connection.next() {
        match event.payload() {
            EventPayload::Connected(_) => connected.store(true, Ordering::Release),
            EventPayload::Disconnected => {
                info!("MQTT: link lost");
                connected.store(false, Ordering::Release);
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                details: Details::Complete,
                ..
            } => {
                if !accept_payload(topic, data.len()) {
                    continue;
                }
                let msg = InboundMessage {
                    topic: topic.to_string(),
                    payload: data.to_vec(),
                };
                if tx.send(msg).is_err() {
                    break;
                }
            }
            EventPayload::Error(e) => warn!("MQTT: client error: {:?}", e),
            _ => {}
        }
    }
    connected.store(false, Ordering::Release);
}

pub(super) fn subscribe(client: &mut Client, topic: &str) -> Result<(), TransportError> {
    client.subscribe(topic, QoS::AtMostOnce).map(|_| ()).map_err(|e| {
        warn!("MQTT: subscribe '{}' failed: {}", topic, e);
        TransportError::SubscribeFailed
    })
}

pub(super) fn publish(client: &mut Client, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
    client
        .publish(topic, QoS::AtMostOnce, false, payload)
        .map(|_| ())
        .map_err(|e| {
            warn!("MQTT: publish '{}' failed: {}", topic, e);
            TransportError::PublishFailed
        })
}

/// Dropping the client stops the ESP-IDF task; nothing to send first.
pub(super) fn close(_client: &mut Client) {}
