//! Application service — the hexagonal core.
//!
//! [`NodeService`] owns the connectivity supervisor, the telemetry
//! publisher and the command dispatcher.  It is constructed once at boot
//! and driven by [`poll`](NodeService::poll) from the main loop.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          NodeService         │
//! ActuatorPort ◀── │ Supervisor · Publisher ·     │ ◀─▶ MessagingPort
//!                  │ Dispatcher · Buttons         │ ◀─▶ NetworkPort
//!                  └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::NodeConfig;
use crate::error::Result;
use crate::events::{BUTTON_EVENTS, Event, EventQueue};

use super::dispatcher::CommandDispatcher;
use super::events::AppEvent;
use super::model::{DeviceIdentity, LinkState, Now, RelayKind};
use super::ports::{ActuatorPort, EventSink, MessagingPort, NetworkPort, SensorPort};
use super::status;
use super::supervisor::ConnectivitySupervisor;
use super::telemetry::TelemetryPublisher;

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    identity: DeviceIdentity,
    supervisor: ConnectivitySupervisor,
    publisher: TelemetryPublisher,
    dispatcher: CommandDispatcher,
    buttons: &'static EventQueue,
    max_inbound: usize,
}

impl NodeService {
    /// Construct the service.  Call [`start`](Self::start) before the
    /// first `poll`.
    pub fn new(config: &NodeConfig, identity: DeviceIdentity) -> Self {
        Self {
            supervisor: ConnectivitySupervisor::new(
                config.reconnect_interval_ms,
                &identity.topics.control,
            ),
            publisher: TelemetryPublisher::new(
                &identity,
                config.publish_interval_ms,
                config.thresholds,
            ),
            dispatcher: CommandDispatcher::new(&identity.topics.control),
            buttons: &BUTTON_EVENTS,
            max_inbound: usize::from(config.max_inbound_per_poll),
            identity,
        }
    }

    /// Read button presses from `queue` instead of the ISR-fed global.
    pub fn with_button_queue(mut self, queue: &'static EventQueue) -> Self {
        self.buttons = queue;
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show the idle colour and announce the service.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let status::Rgb(r, g, b) = status::IDLE;
        hw.set_status_colour(r, g, b);
        sink.emit(&AppEvent::Started);
        info!(
            "NodeService started as '{}' (control topic {})",
            self.identity.device_id, self.identity.topics.control
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration: buttons, links, inbound commands, telemetry.
    ///
    /// Every stage runs even if an earlier one failed; the first error is
    /// returned so the caller has a single place to classify it.
    pub fn poll(
        &mut self,
        now: Now,
        hw: &mut (impl SensorPort + ActuatorPort),
        net: &mut impl NetworkPort,
        mqtt: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        // 1. Local buttons
        self.drain_buttons(hw, sink);

        // 2. Links
        let mut result = self.supervisor.tick(now, net, mqtt, hw, sink);

        // 3. Inbound control messages
        if self.supervisor.is_online() {
            self.drain_inbound(hw, mqtt, sink);
        }

        // 4. Telemetry
        let published = self
            .publisher
            .publish_if_due(now, self.supervisor.is_online(), hw, mqtt, sink);
        if result.is_ok() {
            result = published;
        }

        result
    }

    fn drain_buttons(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.buttons.drain(|event| {
            let relay = match event {
                Event::FanButton => RelayKind::Fan,
                Event::LightButton => RelayKind::Light,
            };
            let on = !hw.is_relay_on(relay);
            hw.set_relay(relay, on);
            info!("{} {}", relay, relay.describe(on));
            sink.emit(&AppEvent::ButtonToggled { relay, on });
        });

        let dropped = self.buttons.take_dropped();
        if dropped > 0 {
            warn!("Button queue full, {} press(es) dropped", dropped);
        }
    }

    fn drain_inbound(
        &mut self,
        hw: &mut impl ActuatorPort,
        mqtt: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) {
        for _ in 0..self.max_inbound {
            let Some(msg) = mqtt.poll_inbound() else {
                break;
            };
            self.dispatcher
                .handle_inbound(&msg.topic, &msg.payload, hw, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn network_state(&self) -> LinkState {
        self.supervisor.network()
    }

    pub fn broker_state(&self) -> LinkState {
        self.supervisor.broker()
    }

    pub fn is_online(&self) -> bool {
        self.supervisor.is_online()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.supervisor.attempts()
    }

    pub fn reports_published(&self) -> u32 {
        self.publisher.published()
    }

    pub fn commands_applied(&self) -> u32 {
        self.dispatcher.applied()
    }

    pub fn commands_rejected(&self) -> u32 {
        self.dispatcher.rejected()
    }
}
