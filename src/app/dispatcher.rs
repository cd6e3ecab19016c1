//! Command dispatcher — inbound control payloads to relay actions.
//!
//! Decoding never fails loudly: a bad payload is logged and dropped and the
//! relays are left untouched.  Applying a command sets an absolute state,
//! so replaying the same message is harmless.

use log::{info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};

use super::events::AppEvent;
use super::model::{ControlCommand, RelayKind};
use super::ports::{ActuatorPort, EventSink};

#[derive(Deserialize)]
struct RawCommand {
    #[serde(rename = "type")]
    device_type: Option<String>,
    action: Option<String>,
}

/// Decode a control payload.
///
/// `type` must name a relay exactly; `action` is `ON` (any case) for on and
/// anything else for off.  Both must be present and non-empty.
pub fn parse_command(payload: &[u8]) -> Result<ControlCommand> {
    let text = core::str::from_utf8(payload).map_err(|_| Error::MalformedCommand)?;
    let raw: RawCommand = serde_json::from_str(text).map_err(|_| Error::MalformedCommand)?;

    let device_type = raw.device_type.filter(|s| !s.is_empty());
    let action = raw.action.filter(|s| !s.is_empty());
    let (Some(device_type), Some(action)) = (device_type, action) else {
        return Err(Error::MalformedCommand);
    };

    let device_type = RelayKind::from_wire(&device_type).ok_or(Error::UnknownDeviceType)?;
    Ok(ControlCommand {
        device_type,
        turn_on: action.eq_ignore_ascii_case("ON"),
    })
}

pub struct CommandDispatcher {
    control_topic: String,
    applied: u32,
    rejected: u32,
}

impl CommandDispatcher {
    pub fn new(control_topic: &str) -> Self {
        Self {
            control_topic: control_topic.to_string(),
            applied: 0,
            rejected: 0,
        }
    }

    pub fn applied(&self) -> u32 {
        self.applied
    }

    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Handle one inbound message.  Messages on other topics are ignored.
    /// Returns the applied command, if any.
    pub fn handle_inbound(
        &mut self,
        topic: &str,
        payload: &[u8],
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<ControlCommand> {
        if topic != self.control_topic {
            return None;
        }

        match parse_command(payload) {
            Ok(cmd) => {
                hw.set_relay(cmd.device_type, cmd.turn_on);
                info!(
                    "{} {}",
                    cmd.device_type,
                    cmd.device_type.describe(cmd.turn_on)
                );
                self.applied = self.applied.wrapping_add(1);
                sink.emit(&AppEvent::CommandApplied(cmd));
                Some(cmd)
            }
            Err(e) => {
                warn!("Dropping control message on {}: {}", topic, e);
                self.rejected = self.rejected.wrapping_add(1);
                None
            }
        }
    }
}
