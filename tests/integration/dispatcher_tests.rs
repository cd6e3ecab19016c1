//! Control-command dispatcher against the mock actuator.

use crate::mock_hw::{MockHardware, RecordingSink};

use yolohome::app::dispatcher::CommandDispatcher;
use yolohome::app::events::AppEvent;
use yolohome::app::model::{ControlCommand, RelayKind};

const CONTROL: &str = "yolohome/devices/yolobit1/control";

fn rig() -> (CommandDispatcher, MockHardware, RecordingSink) {
    (
        CommandDispatcher::new(CONTROL),
        MockHardware::new(),
        RecordingSink::new(),
    )
}

#[test]
fn door_on_then_on_again_stays_on() {
    let (mut d, mut hw, mut sink) = rig();

    let first = d.handle_inbound(CONTROL, br#"{"type":"door","action":"on"}"#, &mut hw, &mut sink);
    assert_eq!(
        first,
        Some(ControlCommand {
            device_type: RelayKind::Door,
            turn_on: true,
        })
    );
    assert!(hw.door);

    d.handle_inbound(CONTROL, br#"{"type":"door","action":"ON"}"#, &mut hw, &mut sink);
    assert!(hw.door);
    assert_eq!(d.applied(), 2);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandApplied(_))),
        2
    );
}

#[test]
fn each_relay_is_addressable() {
    let (mut d, mut hw, mut sink) = rig();

    d.handle_inbound(CONTROL, br#"{"type":"fan","action":"ON"}"#, &mut hw, &mut sink);
    d.handle_inbound(CONTROL, br#"{"type":"light","action":"ON"}"#, &mut hw, &mut sink);
    assert!(hw.fan && hw.light_relay && !hw.door);

    d.handle_inbound(CONTROL, br#"{"type":"fan","action":"OFF"}"#, &mut hw, &mut sink);
    assert!(!hw.fan && hw.light_relay);
}

#[test]
fn other_topics_are_ignored() {
    let (mut d, mut hw, mut sink) = rig();

    let r = d.handle_inbound(
        "yolohome/devices/other/control",
        br#"{"type":"door","action":"ON"}"#,
        &mut hw,
        &mut sink,
    );

    assert_eq!(r, None);
    assert!(hw.relay_writes.is_empty());
    assert_eq!(d.rejected(), 0);
}

#[test]
fn bad_payloads_are_dropped_without_side_effects() {
    let (mut d, mut hw, mut sink) = rig();
    let payloads: [&[u8]; 7] = [
        b"",
        b"not json",
        b"\xff\xfe",
        br#"{"type":"door"}"#,
        br#"{"action":"ON"}"#,
        br#"{"type":"","action":"ON"}"#,
        br#"{"type":"garage","action":"ON"}"#,
    ];

    for p in payloads {
        assert_eq!(d.handle_inbound(CONTROL, p, &mut hw, &mut sink), None);
    }

    assert!(hw.relay_writes.is_empty());
    assert_eq!(d.rejected(), payloads.len() as u32);
    assert!(sink.events.is_empty());
}
