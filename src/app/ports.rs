//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (sensors, relays, WiFi, MQTT, event sinks) implement
//! these traits.  The [`NodeService`](super::service::NodeService) and its
//! components consume them via generics, so the domain core never touches
//! hardware or sockets directly.

use core::fmt;

use super::model::RelayKind;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Temperature (°C) and relative humidity (%).  Either is `None` when
    /// the bus read failed; that is not an error for the caller.
    fn read_temperature_humidity(&mut self) -> (Option<f32>, Option<f32>);

    /// PIR output level.
    fn read_motion(&mut self) -> bool;

    /// Raw 12-bit light ADC value (higher = darker).
    fn read_light(&mut self) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command relays and the LED.
pub trait ActuatorPort {
    /// Drive a relay to an absolute state.
    fn set_relay(&mut self, kind: RelayKind, on: bool);

    /// Last commanded relay state.
    fn is_relay_on(&self, kind: RelayKind) -> bool;

    /// Set the RGB status indicator colour.
    fn set_status_colour(&mut self, r: u8, g: u8, b: u8);
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

/// Network link underneath the broker connection.
pub trait NetworkPort {
    /// Bring the link up.  Blocks for at most the adapter's bounded wait.
    fn connect(&mut self) -> Result<(), NetworkError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Messaging port (driven adapter: domain ↔ MQTT client library)
// ───────────────────────────────────────────────────────────────

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Publish/subscribe transport to the broker.
pub trait MessagingPort {
    /// Open a session with the broker.
    fn connect(&mut self) -> Result<(), TransportError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Next received message, if any.  Never blocks.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`NetworkPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// No SSID configured.
    NoCredentials,
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open) or 8-64 bytes (WPA2).
    InvalidPassword,
    /// Association did not complete within the bounded wait.
    Timeout,
    /// The WiFi driver rejected a call.
    Driver,
}

/// Errors from [`MessagingPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Operation requires an open broker session.
    NotConnected,
    /// Broker refused or did not answer the connect.
    ConnectFailed,
    /// Subscribe request was rejected.
    SubscribeFailed,
    /// Publish could not be queued or sent.
    PublishFailed,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::Timeout => write!(f, "WiFi connect timed out"),
            Self::Driver => write!(f, "WiFi driver error"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected to broker"),
            Self::ConnectFailed => write!(f, "broker connect failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
        }
    }
}
