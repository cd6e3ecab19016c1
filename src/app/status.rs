//! Status LED colours for each connectivity phase.

use super::model::LinkState;

/// An RGB triple at the status LED's working brightness (0-20).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const IDLE: Rgb = Rgb(0, 0, 20);
pub const NETWORK_CONNECTING: Rgb = Rgb(20, 20, 0);
pub const BROKER_CONNECTING: Rgb = Rgb(20, 0, 20);
pub const CONNECTED: Rgb = Rgb(0, 20, 0);
pub const FAILED: Rgb = Rgb(20, 0, 0);

/// Colour for a steady link combination.
///
/// A failed attempt is signalled by the supervisor directly with [`FAILED`];
/// this covers every other phase.
pub fn for_links(network: LinkState, broker: LinkState) -> Rgb {
    match (network, broker) {
        (LinkState::Connecting, _) => NETWORK_CONNECTING,
        (LinkState::Connected, LinkState::Connecting) => BROKER_CONNECTING,
        (LinkState::Connected, _) => CONNECTED,
        (LinkState::Disconnected, _) => IDLE,
    }
}
