//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the YoloHome node: link
//! supervision, telemetry and alerting, and remote/local relay control.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod alerts;
pub mod dispatcher;
pub mod events;
pub mod model;
pub mod ports;
pub mod service;
pub mod status;
pub mod supervisor;
pub mod telemetry;
