//! Outbound application events.
//!
//! The core emits these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them; the
//! firmware logs them to the serial console.

use super::model::{ControlCommand, LinkLayer, LinkState, RelayKind};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has been constructed and the status LED shows idle.
    Started,

    /// A connectivity layer changed state.
    LinkChanged {
        layer: LinkLayer,
        from: LinkState,
        to: LinkState,
    },

    /// A remote control command was applied to a relay.
    CommandApplied(ControlCommand),

    /// A local push-button toggled a relay.
    ButtonToggled { relay: RelayKind, on: bool },

    /// The publisher switched the fan on in response to a temperature alert.
    FanAutoOn { temperature_c: f32 },

    /// A telemetry cycle finished.
    TelemetryPublished {
        alerts: usize,
        failed_publishes: usize,
    },
}
