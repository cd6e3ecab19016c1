//! Connectivity supervisor against mock network and broker adapters.

use crate::mock_hw::{MockBroker, MockHardware, MockNetwork, RecordingSink};

use yolohome::app::events::AppEvent;
use yolohome::app::model::{LinkLayer, LinkState, Now};
use yolohome::app::status::{self, Rgb};
use yolohome::app::supervisor::ConnectivitySupervisor;
use yolohome::error::Error;

const CONTROL: &str = "yolohome/devices/yolobit1/control";
const INTERVAL_MS: u32 = 5_000;

fn at(ms: u64) -> Now {
    Now {
        uptime_ms: ms,
        unix_secs: 1_700_000_000 + ms / 1000,
    }
}

fn rgb(c: Rgb) -> (u8, u8, u8) {
    (c.0, c.1, c.2)
}

struct Rig {
    sup: ConnectivitySupervisor,
    net: MockNetwork,
    mqtt: MockBroker,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new(net: MockNetwork, mqtt: MockBroker) -> Self {
        Self {
            sup: ConnectivitySupervisor::new(INTERVAL_MS, CONTROL),
            net,
            mqtt,
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
        }
    }

    fn tick(&mut self, ms: u64) -> Result<(), Error> {
        self.sup
            .tick(at(ms), &mut self.net, &mut self.mqtt, &mut self.hw, &mut self.sink)
    }
}

#[test]
fn first_tick_brings_both_layers_up() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::new());

    rig.tick(0).unwrap();

    assert_eq!(rig.sup.network(), LinkState::Connected);
    assert_eq!(rig.sup.broker(), LinkState::Connected);
    assert!(rig.sup.is_online());
    assert_eq!(rig.mqtt.subscriptions, vec![CONTROL.to_string()]);
    assert_eq!(
        rig.hw.colours,
        vec![
            rgb(status::NETWORK_CONNECTING),
            rgb(status::CONNECTED),
            rgb(status::BROKER_CONNECTING),
            rgb(status::CONNECTED),
        ]
    );
}

#[test]
fn network_failure_skips_broker_and_shows_red() {
    let mut rig = Rig::new(MockNetwork::unreachable(), MockBroker::new());

    let err = rig.tick(0).unwrap_err();

    assert!(matches!(err, Error::NetworkUnavailable(_)));
    assert!(err.is_link_failure());
    assert_eq!(rig.sup.network(), LinkState::Disconnected);
    assert_eq!(rig.sup.broker(), LinkState::Disconnected);
    assert_eq!(rig.mqtt.connects, 0, "broker must not be tried without a network");
    assert_eq!(rig.hw.last_colour(), Some(rgb(status::FAILED)));
}

#[test]
fn broker_failure_keeps_network_and_shows_red() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::unreachable());

    let err = rig.tick(0).unwrap_err();

    assert!(matches!(err, Error::BrokerUnavailable(_)));
    assert_eq!(rig.sup.network(), LinkState::Connected);
    assert_eq!(rig.sup.broker(), LinkState::Disconnected);
    assert_eq!(rig.hw.last_colour(), Some(rgb(status::FAILED)));
}

#[test]
fn rejected_subscription_tears_the_session_down() {
    let mut broker = MockBroker::new();
    broker.accept_subscribe = false;
    let mut rig = Rig::new(MockNetwork::new(), broker);

    assert!(rig.tick(0).is_err());
    assert_eq!(rig.sup.broker(), LinkState::Disconnected);
    assert!(!rig.mqtt.connected);
    assert_eq!(rig.mqtt.disconnects, 1);
}

#[test]
fn attempts_are_rate_limited() {
    let mut rig = Rig::new(MockNetwork::unreachable(), MockBroker::new());

    let _ = rig.tick(0);
    let _ = rig.tick(100);
    let _ = rig.tick(4_999);
    assert_eq!(rig.net.connects, 1);

    let _ = rig.tick(5_000);
    assert_eq!(rig.net.connects, 2);
    assert_eq!(rig.sup.attempts(), 2);
}

#[test]
fn gated_tick_is_silent() {
    let mut rig = Rig::new(MockNetwork::unreachable(), MockBroker::new());
    let _ = rig.tick(0);
    let before = rig.sink.events.len();

    assert!(rig.tick(1_000).is_ok());
    assert_eq!(rig.sink.events.len(), before);
}

#[test]
fn online_tick_makes_no_attempt() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::new());
    rig.tick(0).unwrap();

    rig.tick(10_000).unwrap();

    assert_eq!(rig.net.connects, 1);
    assert_eq!(rig.mqtt.connects, 1);
    assert_eq!(rig.sup.attempts(), 1);
}

#[test]
fn network_drop_is_observed_inside_the_gate() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::new());
    rig.tick(0).unwrap();

    rig.net.up = false;
    rig.tick(1_000).unwrap();

    assert_eq!(rig.sup.network(), LinkState::Disconnected);
    assert_eq!(rig.sup.broker(), LinkState::Disconnected);
    assert_eq!(rig.mqtt.disconnects, 1);
    assert_eq!(rig.hw.last_colour(), Some(rgb(status::IDLE)));
    // Reconnect waits for the gate.
    assert_eq!(rig.net.connects, 1);

    rig.tick(5_000).unwrap();
    assert!(rig.sup.is_online());
    assert_eq!(rig.net.connects, 2);
    assert_eq!(rig.mqtt.connects, 2);
}

#[test]
fn broker_drop_reconnects_broker_only() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::new());
    rig.tick(0).unwrap();

    rig.mqtt.connected = false;
    rig.tick(6_000).unwrap();

    assert!(rig.sup.is_online());
    assert_eq!(rig.net.connects, 1);
    assert_eq!(rig.mqtt.connects, 2);
    assert_eq!(rig.mqtt.subscriptions.len(), 2);
}

#[test]
fn link_changes_are_emitted_in_order() {
    let mut rig = Rig::new(MockNetwork::new(), MockBroker::new());
    rig.tick(0).unwrap();

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::LinkChanged { layer, to, .. } => Some((*layer, *to)),
            _ => None,
        })
        .collect();

    assert_eq!(
        changes,
        vec![
            (LinkLayer::Network, LinkState::Connecting),
            (LinkLayer::Network, LinkState::Connected),
            (LinkLayer::Broker, LinkState::Connecting),
            (LinkLayer::Broker, LinkState::Connected),
        ]
    );
}
