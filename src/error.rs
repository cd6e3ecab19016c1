//! Unified error types for the YoloHome node firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling to one `match`.  All variants are `Copy`
//! so they can be returned from the supervisor and publisher without
//! allocation.

use core::fmt;

use crate::app::ports::{NetworkError, TransportError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The network link could not be brought up within the bounded wait.
    NetworkUnavailable(NetworkError),
    /// Broker connect, subscribe or publish failed.
    BrokerUnavailable(TransportError),
    /// A sensor could not be read; the affected field is omitted.
    SensorReadFailure(SensorError),
    /// Inbound control payload could not be decoded or lacks a field.
    MalformedCommand,
    /// Inbound control payload names a device this node does not drive.
    UnknownDeviceType,
    /// Peripheral initialisation failed (fatal, startup only).
    Init(&'static str),
    /// Configuration is invalid (fatal, startup only).
    Config(&'static str),
}

impl Error {
    /// Link failures are already rate-limited by the reconnect timer, so the
    /// main loop does not add a fault back-off for them.
    pub fn is_link_failure(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_) | Self::BrokerUnavailable(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable(e) => write!(f, "network unavailable: {e}"),
            Self::BrokerUnavailable(e) => write!(f, "broker unavailable: {e}"),
            Self::SensorReadFailure(e) => write!(f, "sensor read failure: {e}"),
            Self::MalformedCommand => write!(f, "malformed control command"),
            Self::UnknownDeviceType => write!(f, "unknown device type"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Device did not acknowledge its address.
    NotFound,
    /// I2C transaction failed.
    Bus,
    /// Measurement still in progress (status busy bit set).
    Busy,
    /// Frame CRC did not match.
    ChecksumMismatch,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "sensor not found on bus"),
            Self::Bus => write!(f, "bus transaction failed"),
            Self::Busy => write!(f, "sensor busy"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::SensorReadFailure(e)
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::NetworkUnavailable(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::BrokerUnavailable(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
