//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on relay state, LED history,
//! published messages and emitted events without touching real GPIO or a
//! broker.

use std::collections::VecDeque;

use yolohome::app::events::AppEvent;
use yolohome::app::model::RelayKind;
use yolohome::app::ports::{
    ActuatorPort, EventSink, InboundMessage, MessagingPort, NetworkError, NetworkPort,
    SensorPort, TransportError,
};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub motion: bool,
    pub light: i32,
    pub fan: bool,
    pub light_relay: bool,
    pub door: bool,
    pub colours: Vec<(u8, u8, u8)>,
    pub relay_writes: Vec<(RelayKind, bool)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            temperature: Some(22.0),
            humidity: Some(50.0),
            motion: false,
            light: 2000,
            fan: false,
            light_relay: false,
            door: false,
            colours: Vec::new(),
            relay_writes: Vec::new(),
        }
    }

    pub fn with_reading(temperature: f32, humidity: f32, motion: bool, light: i32) -> Self {
        Self {
            temperature: Some(temperature),
            humidity: Some(humidity),
            motion,
            light,
            ..Self::new()
        }
    }

    pub fn last_colour(&self) -> Option<(u8, u8, u8)> {
        self.colours.last().copied()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature_humidity(&mut self) -> (Option<f32>, Option<f32>) {
        (self.temperature, self.humidity)
    }

    fn read_motion(&mut self) -> bool {
        self.motion
    }

    fn read_light(&mut self) -> i32 {
        self.light
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay(&mut self, kind: RelayKind, on: bool) {
        self.relay_writes.push((kind, on));
        match kind {
            RelayKind::Fan => self.fan = on,
            RelayKind::Light => self.light_relay = on,
            RelayKind::Door => self.door = on,
        }
    }

    fn is_relay_on(&self, kind: RelayKind) -> bool {
        match kind {
            RelayKind::Fan => self.fan,
            RelayKind::Light => self.light_relay,
            RelayKind::Door => self.door,
        }
    }

    fn set_status_colour(&mut self, r: u8, g: u8, b: u8) {
        self.colours.push((r, g, b));
    }
}

// ── MockNetwork ───────────────────────────────────────────────

pub struct MockNetwork {
    /// Whether a connect attempt succeeds.
    pub reachable: bool,
    /// Current link level; tests clear it to simulate a drop.
    pub up: bool,
    pub connects: u32,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn new() -> Self {
        Self {
            reachable: true,
            up: false,
            connects: 0,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPort for MockNetwork {
    fn connect(&mut self) -> Result<(), NetworkError> {
        self.connects += 1;
        if self.reachable {
            self.up = true;
            Ok(())
        } else {
            Err(NetworkError::Timeout)
        }
    }

    fn disconnect(&mut self) {
        self.up = false;
    }

    fn is_connected(&self) -> bool {
        self.up
    }
}

// ── MockBroker ────────────────────────────────────────────────

pub struct MockBroker {
    pub reachable: bool,
    pub accept_subscribe: bool,
    pub accept_publish: bool,
    pub connected: bool,
    pub connects: u32,
    pub disconnects: u32,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, Vec<u8>)>,
    pub inbound: VecDeque<InboundMessage>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new() -> Self {
        Self {
            reachable: true,
            accept_subscribe: true,
            accept_publish: true,
            connected: false,
            connects: 0,
            disconnects: 0,
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn push_inbound(&mut self, topic: &str, payload: &[u8]) {
        self.inbound.push_back(InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
    }

    pub fn published_on(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| serde_json::from_slice(p).expect("published payload is JSON"))
            .collect()
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingPort for MockBroker {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connects += 1;
        if self.reachable {
            self.connected = true;
            Ok(())
        } else {
            Err(TransportError::ConnectFailed)
        }
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if !self.accept_subscribe {
            return Err(TransportError::SubscribeFailed);
        }
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if !self.accept_publish {
            return Err(TransportError::PublishFailed);
        }
        self.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
