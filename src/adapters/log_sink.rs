//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on the device, stderr on a host build).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::model::LinkState;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | node up, status idle");
            }
            AppEvent::LinkChanged { layer, from, to } => {
                if *to == LinkState::Disconnected && *from == LinkState::Connected {
                    warn!("LINK  | {:?} lost ({:?} -> {:?})", layer, from, to);
                } else {
                    info!("LINK  | {:?} {:?} -> {:?}", layer, from, to);
                }
            }
            AppEvent::CommandApplied(cmd) => {
                info!(
                    "CMD   | {} -> {}",
                    cmd.device_type,
                    if cmd.turn_on { "ON" } else { "OFF" }
                );
            }
            AppEvent::ButtonToggled { relay, on } => {
                info!("BTN   | {} -> {}", relay, if *on { "ON" } else { "OFF" });
            }
            AppEvent::FanAutoOn { temperature_c } => {
                warn!("FAN   | forced on at {:.1}\u{00b0}C", temperature_c);
            }
            AppEvent::TelemetryPublished {
                alerts,
                failed_publishes,
            } => {
                if *failed_publishes > 0 {
                    warn!(
                        "TELEM | alerts={} failed_publishes={}",
                        alerts, failed_publishes
                    );
                } else {
                    info!("TELEM | alerts={}", alerts);
                }
            }
        }
    }
}
