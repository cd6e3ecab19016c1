//! Connectivity supervisor — owns the network and broker link states.
//!
//! Each [`tick`](ConnectivitySupervisor::tick) first *observes* both links
//! (a dropped link is noticed immediately, regardless of the reconnect
//! gate), then, at most once per `interval_ms`, tries to bring up whatever
//! layer is down.  The broker is only attempted once the network is up.
//!
//! ```text
//!   Disconnected ──attempt──▶ Connecting ──ok──▶ Connected
//!        ▲                        │                  │
//!        └────────fail────────────┘◀──observed drop──┘
//! ```

use log::{info, warn};

use crate::error::{Error, Result};

use super::events::AppEvent;
use super::model::{LinkLayer, LinkState, Now};
use super::ports::{ActuatorPort, EventSink, MessagingPort, NetworkPort};
use super::status::{self, Rgb};

pub struct ConnectivitySupervisor {
    network: LinkState,
    broker: LinkState,
    /// `None` until the first attempt so the first tick after boot connects
    /// immediately.
    last_attempt: Option<u64>,
    interval_ms: u64,
    control_topic: String,
    attempts: u32,
}

impl ConnectivitySupervisor {
    pub fn new(interval_ms: u32, control_topic: &str) -> Self {
        Self {
            network: LinkState::Disconnected,
            broker: LinkState::Disconnected,
            last_attempt: None,
            interval_ms: u64::from(interval_ms),
            control_topic: control_topic.to_string(),
            attempts: 0,
        }
    }

    pub fn network(&self) -> LinkState {
        self.network
    }

    pub fn broker(&self) -> LinkState {
        self.broker
    }

    /// Whether telemetry may be published right now.
    pub fn is_online(&self) -> bool {
        self.broker == LinkState::Connected
    }

    /// Reconnect attempts made since boot (one per opened gate with a
    /// layer down).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Observe both links, then reconnect whatever is down if the gate is
    /// open.  Returns the failure of this tick's attempt, if any.
    pub fn tick(
        &mut self,
        now: Now,
        net: &mut impl NetworkPort,
        mqtt: &mut impl MessagingPort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.observe(net, mqtt, hw, sink);

        let gated = self
            .last_attempt
            .is_some_and(|last| now.uptime_ms.saturating_sub(last) < self.interval_ms);
        if gated {
            return Ok(());
        }
        self.last_attempt = Some(now.uptime_ms);

        if self.is_online() {
            return Ok(());
        }
        self.attempts = self.attempts.saturating_add(1);

        if self.network != LinkState::Connected {
            self.connect_network(net, hw, sink)?;
        }

        if self.network == LinkState::Connected && self.broker != LinkState::Connected {
            self.connect_broker(mqtt, hw, sink)?;
        }

        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    /// Fold externally observed drops into the state machine.
    fn observe(
        &mut self,
        net: &mut impl NetworkPort,
        mqtt: &mut impl MessagingPort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if self.network == LinkState::Connected && !net.is_connected() {
            warn!("Network link lost");
            if self.broker != LinkState::Disconnected {
                mqtt.disconnect();
            }
            self.set_broker(LinkState::Disconnected, sink);
            self.set_network(LinkState::Disconnected, sink);
            show(hw, status::for_links(self.network, self.broker));
            return;
        }

        if self.broker == LinkState::Connected && !mqtt.is_connected() {
            warn!("Broker link lost");
            self.set_broker(LinkState::Disconnected, sink);
            show(hw, status::for_links(self.network, self.broker));
        }
    }

    fn connect_network(
        &mut self,
        net: &mut impl NetworkPort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.set_network(LinkState::Connecting, sink);
        show(hw, status::NETWORK_CONNECTING);

        match net.connect() {
            Ok(()) => {
                info!("Network connected");
                self.set_network(LinkState::Connected, sink);
                show(hw, status::for_links(self.network, self.broker));
                Ok(())
            }
            Err(e) => {
                warn!("Network connect failed: {}", e);
                self.set_network(LinkState::Disconnected, sink);
                show(hw, status::FAILED);
                Err(Error::NetworkUnavailable(e))
            }
        }
    }

    fn connect_broker(
        &mut self,
        mqtt: &mut impl MessagingPort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.set_broker(LinkState::Connecting, sink);
        show(hw, status::BROKER_CONNECTING);

        let mut outcome = mqtt.connect();
        if outcome.is_ok() {
            outcome = mqtt.subscribe(&self.control_topic);
            if outcome.is_err() {
                // No control subscription, no session.
                mqtt.disconnect();
            }
        }

        match outcome {
            Ok(()) => {
                info!("Broker connected, subscribed to {}", self.control_topic);
                self.set_broker(LinkState::Connected, sink);
                show(hw, status::CONNECTED);
                Ok(())
            }
            Err(e) => {
                warn!("Broker connect failed: {}", e);
                self.set_broker(LinkState::Disconnected, sink);
                show(hw, status::FAILED);
                Err(Error::BrokerUnavailable(e))
            }
        }
    }

    fn set_network(&mut self, to: LinkState, sink: &mut impl EventSink) {
        if self.network != to {
            sink.emit(&AppEvent::LinkChanged {
                layer: LinkLayer::Network,
                from: self.network,
                to,
            });
            self.network = to;
        }
    }

    fn set_broker(&mut self, to: LinkState, sink: &mut impl EventSink) {
        if self.broker != to {
            sink.emit(&AppEvent::LinkChanged {
                layer: LinkLayer::Broker,
                from: self.broker,
                to,
            });
            self.broker = to;
        }
    }
}

fn show(hw: &mut impl ActuatorPort, Rgb(r, g, b): Rgb) {
    hw.set_status_colour(r, g, b);
}
