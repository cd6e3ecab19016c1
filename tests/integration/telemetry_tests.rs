//! Telemetry publisher: payload shape, alert fan-out and fan auto-on.

use crate::mock_hw::{MockBroker, MockHardware, RecordingSink};

use yolohome::app::events::AppEvent;
use yolohome::app::model::{ALERT_TOPIC, DeviceIdentity, Now};
use yolohome::app::telemetry::TelemetryPublisher;
use yolohome::config::Thresholds;
use yolohome::error::Error;

const SENSOR_TOPIC: &str = "yolohome/sensors/yolobit1";
const INTERVAL_MS: u32 = 10_000;
const TS: u64 = 1_700_000_000;

fn at(ms: u64) -> Now {
    Now {
        uptime_ms: ms,
        unix_secs: TS,
    }
}

fn publisher() -> TelemetryPublisher {
    TelemetryPublisher::new(
        &DeviceIdentity::new("yolobit1", "yolohome"),
        INTERVAL_MS,
        Thresholds::default(),
    )
}

fn online_broker() -> MockBroker {
    let mut b = MockBroker::new();
    b.connected = true;
    b
}

#[test]
fn hot_dry_motion_reading_end_to_end() {
    let mut p = publisher();
    let mut hw = MockHardware::with_reading(32.0, 25.0, true, 300);
    let mut mqtt = online_broker();
    let mut sink = RecordingSink::new();

    p.publish_now(at(0), &mut hw, &mut mqtt, &mut sink).unwrap();

    assert!(hw.fan, "temperature alert must force the fan on");
    assert_eq!(mqtt.published.len(), 4, "one report plus three alerts");

    let reports = mqtt.published_on(SENSOR_TOPIC);
    assert_eq!(reports.len(), 1);
    let r = &reports[0];
    assert_eq!(r["device_id"], "yolobit1");
    assert_eq!(r["timestamp"], TS);
    assert_eq!(r["sensors"]["temperature"], 32.0);
    assert_eq!(r["sensors"]["humidity"], 25.0);
    assert_eq!(r["sensors"]["motion"], true);
    assert_eq!(r["sensors"]["light"], 300);
    assert_eq!(r["status"]["fan"], true);
    assert_eq!(r["status"]["light"], false);
    assert_eq!(r["status"]["door"], false);

    let kinds: Vec<_> = r["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, ["temperature", "humidity", "motion"]);

    let alerts = mqtt.published_on(ALERT_TOPIC);
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0]["device_id"], "yolobit1");
    assert_eq!(alerts[0]["sensor_id"], "temperature");
    assert_eq!(alerts[0]["type"], "temperature");
    assert_eq!(alerts[0]["message"], "Temperature above threshold: 32.0\u{b0}C");
    assert_eq!(alerts[1]["message"], "Humidity below threshold: 25.0%");
    assert_eq!(alerts[2]["message"], "Motion detected");
    assert_eq!(alerts[2]["timestamp"], TS);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::FanAutoOn { .. })),
        1
    );
    assert!(sink.events.contains(&AppEvent::TelemetryPublished {
        alerts: 3,
        failed_publishes: 0,
    }));
}

#[test]
fn quiet_reading_has_no_alerts_key() {
    let mut p = publisher();
    let mut hw = MockHardware::with_reading(22.0, 50.0, false, 2000);
    let mut mqtt = online_broker();
    let mut sink = RecordingSink::new();

    p.publish_now(at(0), &mut hw, &mut mqtt, &mut sink).unwrap();

    assert_eq!(mqtt.published.len(), 1);
    let r = &mqtt.published_on(SENSOR_TOPIC)[0];
    assert!(r.get("alerts").is_none());
    assert!(!hw.fan);
}

#[test]
fn missing_climate_reading_is_null_and_raises_nothing() {
    let mut p = publisher();
    let mut hw = MockHardware::new();
    hw.temperature = None;
    hw.humidity = None;
    let mut mqtt = online_broker();
    let mut sink = RecordingSink::new();

    p.publish_now(at(0), &mut hw, &mut mqtt, &mut sink).unwrap();

    let r = &mqtt.published_on(SENSOR_TOPIC)[0];
    assert!(r["sensors"]["temperature"].is_null());
    assert!(r["sensors"]["humidity"].is_null());
    assert!(mqtt.published_on(ALERT_TOPIC).is_empty());
}

#[test]
fn fan_already_on_is_not_rewritten() {
    let mut p = publisher();
    let mut hw = MockHardware::with_reading(35.0, 50.0, false, 2000);
    hw.fan = true;
    let mut mqtt = online_broker();
    let mut sink = RecordingSink::new();

    p.publish_now(at(0), &mut hw, &mut mqtt, &mut sink).unwrap();

    assert!(hw.relay_writes.is_empty());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::FanAutoOn { .. })),
        0
    );
}

#[test]
fn publish_if_due_respects_the_interval() {
    let mut p = publisher();
    let mut hw = MockHardware::new();
    let mut mqtt = online_broker();
    let mut sink = RecordingSink::new();

    p.publish_if_due(at(10_000), true, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    p.publish_if_due(at(15_000), true, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    assert_eq!(p.published(), 1);

    p.publish_if_due(at(20_000), true, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    assert_eq!(p.published(), 2);
}

#[test]
fn offline_due_tick_restarts_the_timer() {
    let mut p = publisher();
    let mut hw = MockHardware::new();
    let mut mqtt = MockBroker::new();
    let mut sink = RecordingSink::new();

    p.publish_if_due(at(10_000), false, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    assert!(mqtt.published.is_empty());

    mqtt.connected = true;
    p.publish_if_due(at(12_000), true, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    assert_eq!(p.published(), 0, "must wait a full interval after the skipped one");

    p.publish_if_due(at(20_000), true, &mut hw, &mut mqtt, &mut sink)
        .unwrap();
    assert_eq!(p.published(), 1);
}

#[test]
fn failed_publish_is_reported_after_every_attempt() {
    let mut p = publisher();
    let mut hw = MockHardware::with_reading(32.0, 25.0, true, 300);
    let mut mqtt = online_broker();
    mqtt.accept_publish = false;
    let mut sink = RecordingSink::new();

    let err = p.publish_now(at(0), &mut hw, &mut mqtt, &mut sink).unwrap_err();

    assert!(matches!(err, Error::BrokerUnavailable(_)));
    assert!(hw.fan, "actuation happens before publishing");
    assert!(sink.events.contains(&AppEvent::TelemetryPublished {
        alerts: 3,
        failed_publishes: 4,
    }));
}
