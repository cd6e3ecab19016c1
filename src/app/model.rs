//! Domain data model shared by the supervisor, publisher and dispatcher.

use core::fmt::{self, Write as _};

use serde::{Serialize, Serializer};

use crate::config::NodeConfig;

/// Topic every node publishes alerts on.
pub const ALERT_TOPIC: &str = "yolohome/alerts";

/// Alert message capacity.  The longest message is the temperature one
/// rendering `-f32::MAX` at one decimal: 74 bytes.
pub type AlertMessage = heapless::String<80>;

/// At most one alert per kind of condition: temperature, humidity, motion.
pub type AlertList = heapless::Vec<Alert, 3>;

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// One sample of the clocks, taken once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    /// Monotonic milliseconds since boot; drives every timer.
    pub uptime_ms: u64,
    /// Wall-clock seconds; only stamped into payloads.
    pub unix_secs: u64,
}

// ───────────────────────────────────────────────────────────────
// Link state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Which connectivity layer a [`LinkState`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Network,
    Broker,
}

// ───────────────────────────────────────────────────────────────
// Identity
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub sensor: String,
    pub control: String,
    pub alert: String,
}

/// Immutable node identity, derived once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub client_id: String,
    pub topics: Topics,
}

impl DeviceIdentity {
    pub fn new(device_id: &str, client_prefix: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            client_id: format!("{client_prefix}_{device_id}"),
            topics: Topics {
                sensor: format!("yolohome/sensors/{device_id}"),
                control: format!("yolohome/devices/{device_id}/control"),
                alert: ALERT_TOPIC.to_string(),
            },
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(&config.device_id, &config.mqtt_client_id)
    }
}

// ───────────────────────────────────────────────────────────────
// Sensors and relays
// ───────────────────────────────────────────────────────────────

/// A fresh snapshot of every sensor, produced per telemetry tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub motion: bool,
    pub light_raw: i32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    Fan,
    Light,
    Door,
}

impl RelayKind {
    pub const ALL: [Self; 3] = [Self::Fan, Self::Light, Self::Door];

    /// Parse the `type` field of a control payload (exact, lowercase).
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "fan" => Some(Self::Fan),
            "light" => Some(Self::Light),
            "door" => Some(Self::Door),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Light => "light",
            Self::Door => "door",
        }
    }

    /// Human wording for log lines; the door relay drives a lock.
    pub fn describe(self, on: bool) -> &'static str {
        match (self, on) {
            (Self::Door, true) => "UNLOCKED",
            (Self::Door, false) => "LOCKED",
            (_, true) => "ON",
            (_, false) => "OFF",
        }
    }
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of relay outputs, embedded in the telemetry payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub fan: bool,
    pub light: bool,
    pub door: bool,
}

// ───────────────────────────────────────────────────────────────
// Alerts
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Temperature,
    HumidityLow,
    HumidityHigh,
    Motion,
}

impl AlertKind {
    /// Wire name; both humidity directions report as `"humidity"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::HumidityLow | Self::HumidityHigh => "humidity",
            Self::Motion => "motion",
        }
    }
}

impl Serialize for AlertKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A threshold violation found in the current reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub value: f32,
    pub message: AlertMessage,
}

impl Alert {
    pub fn new(kind: AlertKind, value: f32) -> Self {
        let mut message = AlertMessage::new();
        let written = match kind {
            AlertKind::Temperature => {
                write!(message, "Temperature above threshold: {value:.1}\u{b0}C")
            }
            AlertKind::HumidityLow => write!(message, "Humidity below threshold: {value:.1}%"),
            AlertKind::HumidityHigh => write!(message, "Humidity above threshold: {value:.1}%"),
            AlertKind::Motion => message.push_str("Motion detected").map_err(|()| fmt::Error),
        };
        debug_assert!(written.is_ok(), "alert message overflowed {} bytes", message.capacity());
        Self {
            kind,
            value,
            message,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Commands
// ───────────────────────────────────────────────────────────────

/// A decoded inbound control instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    pub device_type: RelayKind,
    pub turn_on: bool,
}
