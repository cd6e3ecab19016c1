//! NodeService: one loop iteration end to end against mock adapters.

use crate::mock_hw::{MockBroker, MockHardware, MockNetwork, RecordingSink};

use yolohome::app::events::AppEvent;
use yolohome::app::model::{DeviceIdentity, LinkState, Now, RelayKind};
use yolohome::app::service::NodeService;
use yolohome::app::status;
use yolohome::config::NodeConfig;
use yolohome::error::Error;
use yolohome::events::{Event, EventQueue};

const CONTROL: &str = "yolohome/devices/yolobit1/control";
const SENSORS: &str = "yolohome/sensors/yolobit1";

fn at(ms: u64) -> Now {
    Now {
        uptime_ms: ms,
        unix_secs: 1_700_000_000,
    }
}

/// A service reading from its own queue so tests never share the ISR global.
fn service(queue: &'static EventQueue) -> NodeService {
    let config = NodeConfig::default();
    NodeService::new(&config, DeviceIdentity::from_config(&config)).with_button_queue(queue)
}

fn leak_queue() -> &'static EventQueue {
    Box::leak(Box::new(EventQueue::new()))
}

#[test]
fn start_shows_idle_and_announces() {
    let mut svc = service(leak_queue());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.start(&mut hw, &mut sink);

    let status::Rgb(r, g, b) = status::IDLE;
    assert_eq!(hw.last_colour(), Some((r, g, b)));
    assert_eq!(sink.events, vec![AppEvent::Started]);
}

#[test]
fn first_poll_connects_then_reports_after_one_interval() {
    let mut svc = service(leak_queue());
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::new(),
        MockNetwork::new(),
        MockBroker::new(),
        RecordingSink::new(),
    );

    svc.poll(at(0), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();
    assert!(svc.is_online());
    assert_eq!(mqtt.subscriptions, vec![CONTROL.to_string()]);
    assert!(mqtt.published.is_empty());

    svc.poll(at(10_000), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();
    assert_eq!(mqtt.published_on(SENSORS).len(), 1);
    assert_eq!(svc.reports_published(), 1);
}

#[test]
fn inbound_commands_are_dispatched_when_online() {
    let mut svc = service(leak_queue());
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::new(),
        MockNetwork::new(),
        MockBroker::new(),
        RecordingSink::new(),
    );
    mqtt.push_inbound(CONTROL, br#"{"type":"door","action":"on"}"#);
    mqtt.push_inbound(CONTROL, br#"{"type":"heater","action":"on"}"#);

    svc.poll(at(0), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();

    assert!(hw.door);
    assert_eq!(svc.commands_applied(), 1);
    assert_eq!(svc.commands_rejected(), 1);
}

#[test]
fn inbound_drain_is_bounded_per_poll() {
    let config = NodeConfig {
        max_inbound_per_poll: 2,
        ..NodeConfig::default()
    };
    let mut svc = NodeService::new(&config, DeviceIdentity::from_config(&config))
        .with_button_queue(leak_queue());
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::new(),
        MockNetwork::new(),
        MockBroker::new(),
        RecordingSink::new(),
    );
    for _ in 0..5 {
        mqtt.push_inbound(CONTROL, br#"{"type":"light","action":"ON"}"#);
    }

    svc.poll(at(0), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();
    assert_eq!(svc.commands_applied(), 2);
    assert_eq!(mqtt.inbound.len(), 3);

    svc.poll(at(100), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();
    assert_eq!(svc.commands_applied(), 4);
}

#[test]
fn buttons_toggle_relays_before_anything_else() {
    let queue = leak_queue();
    let mut svc = service(queue);
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::new(),
        MockNetwork::unreachable(),
        MockBroker::new(),
        RecordingSink::new(),
    );
    assert!(queue.push(Event::FanButton));
    assert!(queue.push(Event::LightButton));
    assert!(queue.push(Event::LightButton));

    let _ = svc.poll(at(0), &mut hw, &mut net, &mut mqtt, &mut sink);

    assert!(hw.fan);
    assert!(!hw.light_relay);
    assert_eq!(
        hw.relay_writes,
        vec![
            (RelayKind::Fan, true),
            (RelayKind::Light, true),
            (RelayKind::Light, false),
        ]
    );
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::ButtonToggled {
            relay: RelayKind::Fan,
            on: true,
        })
    );
    assert!(queue.is_empty());
}

#[test]
fn link_failure_is_returned_and_loop_state_survives() {
    let mut svc = service(leak_queue());
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::new(),
        MockNetwork::unreachable(),
        MockBroker::new(),
        RecordingSink::new(),
    );

    let err = svc
        .poll(at(0), &mut hw, &mut net, &mut mqtt, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::NetworkUnavailable(_)));
    assert_eq!(svc.network_state(), LinkState::Disconnected);

    // Recovers on a later gate once the AP answers.
    net.reachable = true;
    svc.poll(at(5_000), &mut hw, &mut net, &mut mqtt, &mut sink).unwrap();
    assert_eq!(svc.broker_state(), LinkState::Connected);
    assert_eq!(svc.reconnect_attempts(), 2);
}

#[test]
fn offline_node_never_publishes() {
    let mut svc = service(leak_queue());
    let (mut hw, mut net, mut mqtt, mut sink) = (
        MockHardware::with_reading(35.0, 20.0, true, 100),
        MockNetwork::new(),
        MockBroker::unreachable(),
        RecordingSink::new(),
    );

    for ms in (0..=30_000).step_by(100) {
        let _ = svc.poll(at(ms), &mut hw, &mut net, &mut mqtt, &mut sink);
    }

    assert!(mqtt.published.is_empty());
    assert!(!hw.fan, "no report means no fan auto-on");
}
