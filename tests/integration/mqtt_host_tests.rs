//! Host broker session: connection events routed by the receiver thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use rumqttc::{ConnAck, ConnectReturnCode, Event, Outgoing, Packet, Publish, QoS};

use crate::mock_hw::{MockHardware, RecordingSink};

use yolohome::adapters::mqtt::{MAX_INBOUND_PAYLOAD, RxFlow, route_event};
use yolohome::app::dispatcher::CommandDispatcher;
use yolohome::app::ports::InboundMessage;

const CONTROL: &str = "yolohome/devices/yolobit1/control";

struct Rx {
    tx: Sender<InboundMessage>,
    rx: Receiver<InboundMessage>,
    connected: AtomicBool,
}

impl Rx {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            connected: AtomicBool::new(false),
        }
    }

    fn route(&self, event: Event) -> RxFlow {
        route_event(event, &self.tx, &self.connected)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

fn connack() -> Event {
    Event::Incoming(Packet::ConnAck(ConnAck::new(ConnectReturnCode::Success, false)))
}

fn publish(topic: &str, payload: Vec<u8>) -> Event {
    Event::Incoming(Packet::Publish(Publish::new(topic, QoS::AtMostOnce, payload)))
}

#[test]
fn connack_marks_the_session_connected() {
    let rx = Rx::new();
    assert!(!rx.is_connected());

    assert_eq!(rx.route(connack()), RxFlow::Continue);
    assert!(rx.is_connected());
}

#[test]
fn control_publish_reaches_the_dispatcher() {
    let rx = Rx::new();
    rx.route(connack());

    let body = br#"{"type":"door","action":"ON"}"#.to_vec();
    assert_eq!(rx.route(publish(CONTROL, body.clone())), RxFlow::Continue);

    let msg = rx.rx.try_recv().unwrap();
    assert_eq!(msg.topic, CONTROL);
    assert_eq!(msg.payload, body);

    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    CommandDispatcher::new(CONTROL).handle_inbound(&msg.topic, &msg.payload, &mut hw, &mut sink);
    assert!(hw.door);
}

#[test]
fn payload_cap_is_inclusive() {
    let rx = Rx::new();

    rx.route(publish(CONTROL, vec![b'x'; MAX_INBOUND_PAYLOAD]));
    assert_eq!(rx.rx.try_recv().unwrap().payload.len(), MAX_INBOUND_PAYLOAD);

    assert_eq!(
        rx.route(publish(CONTROL, vec![b'x'; MAX_INBOUND_PAYLOAD + 1])),
        RxFlow::Continue,
        "an oversized publish is skipped, not fatal"
    );
    assert!(rx.rx.try_recv().is_err());
}

#[test]
fn broker_disconnect_stops_and_clears_the_flag() {
    let rx = Rx::new();
    rx.route(connack());

    assert_eq!(rx.route(Event::Incoming(Packet::Disconnect)), RxFlow::Stop);
    assert!(!rx.is_connected());
}

#[test]
fn dropped_adapter_stops_the_receiver() {
    let Rx { tx, rx, connected } = Rx::new();
    drop(rx);

    let flow = route_event(publish(CONTROL, b"{}".to_vec()), &tx, &connected);
    assert_eq!(flow, RxFlow::Stop);
}

#[test]
fn housekeeping_traffic_is_ignored() {
    let rx = Rx::new();
    rx.route(connack());

    assert_eq!(rx.route(Event::Outgoing(Outgoing::PingReq)), RxFlow::Continue);
    assert_eq!(rx.route(Event::Incoming(Packet::PingResp)), RxFlow::Continue);
    assert!(rx.is_connected());
    assert!(rx.rx.try_recv().is_err());
}
