//! Telemetry publisher — periodic sensor report plus derived alerts.
//!
//! The publisher is the one place where alerting touches actuation: a
//! temperature alert forces the fan on before the relay snapshot is taken,
//! so the report always reflects what the node just did.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::Thresholds;
use crate::error::{Error, Result};

use super::alerts;
use super::events::AppEvent;
use super::model::{Alert, DeviceIdentity, Now, RelayKind, RelayStatus, SensorReading};
use super::ports::{ActuatorPort, EventSink, MessagingPort, SensorPort, TransportError};

// ───────────────────────────────────────────────────────────────
// Wire payloads
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SensorsPayload {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub motion: bool,
    pub light: i32,
}

/// Body published on `yolohome/sensors/{device_id}`.
#[derive(Debug, Serialize)]
pub struct TelemetryPayload<'a> {
    pub device_id: &'a str,
    pub timestamp: u64,
    pub sensors: SensorsPayload,
    pub status: RelayStatus,
    #[serde(skip_serializing_if = "no_alerts")]
    pub alerts: &'a [Alert],
}

/// Body published on `yolohome/alerts`, one per alert.
#[derive(Debug, Serialize)]
pub struct AlertPayload<'a> {
    pub device_id: &'a str,
    pub sensor_id: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'a str,
    pub timestamp: u64,
}

fn no_alerts(alerts: &&[Alert]) -> bool {
    alerts.is_empty()
}

// ───────────────────────────────────────────────────────────────
// TelemetryPublisher
// ───────────────────────────────────────────────────────────────

pub struct TelemetryPublisher {
    last_publish: u64,
    interval_ms: u64,
    thresholds: Thresholds,
    device_id: String,
    sensor_topic: String,
    alert_topic: String,
    published: u32,
}

impl TelemetryPublisher {
    pub fn new(identity: &DeviceIdentity, interval_ms: u32, thresholds: Thresholds) -> Self {
        Self {
            last_publish: 0,
            interval_ms: u64::from(interval_ms),
            thresholds,
            device_id: identity.device_id.clone(),
            sensor_topic: identity.topics.sensor.clone(),
            alert_topic: identity.topics.alert.clone(),
            published: 0,
        }
    }

    /// Completed telemetry cycles since boot.
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Publish a report if the interval has elapsed.
    ///
    /// The timer restarts whenever it is due, online or not, so a node that
    /// comes back online waits a full interval before its next report.
    pub fn publish_if_due(
        &mut self,
        now: Now,
        online: bool,
        hw: &mut (impl SensorPort + ActuatorPort),
        mqtt: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if now.uptime_ms.saturating_sub(self.last_publish) < self.interval_ms {
            return Ok(());
        }
        self.last_publish = now.uptime_ms;

        if !online {
            debug!("Telemetry due but broker offline, skipping");
            return Ok(());
        }

        self.publish_now(now, hw, mqtt, sink)
    }

    /// Read, evaluate, actuate, publish.  Every publish is attempted even if
    /// an earlier one failed; the first failure is reported afterwards.
    pub fn publish_now(
        &mut self,
        now: Now,
        hw: &mut (impl SensorPort + ActuatorPort),
        mqtt: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let reading = read_sensors(hw, now);
        let raised = alerts::evaluate(&reading, &self.thresholds);

        if alerts::has_temperature_alert(&raised) && !hw.is_relay_on(RelayKind::Fan) {
            let t = reading.temperature_c.unwrap_or_default();
            hw.set_relay(RelayKind::Fan, true);
            info!("Auto turning ON fan. Temperature: {:.1}\u{b0}C", t);
            sink.emit(&AppEvent::FanAutoOn { temperature_c: t });
        }

        let payload = TelemetryPayload {
            device_id: &self.device_id,
            timestamp: reading.timestamp,
            sensors: SensorsPayload {
                temperature: reading.temperature_c,
                humidity: reading.humidity_pct,
                motion: reading.motion,
                light: reading.light_raw,
            },
            status: relay_status(&*hw),
            alerts: &raised,
        };

        let mut failed = 0usize;

        if send(mqtt, &self.sensor_topic, &payload) {
            info!(
                "Published sensor data: Temp={:?}, Humidity={:?}, Motion={}, Light={}",
                reading.temperature_c, reading.humidity_pct, reading.motion, reading.light_raw
            );
        } else {
            failed += 1;
        }

        for alert in &raised {
            let body = AlertPayload {
                device_id: &self.device_id,
                sensor_id: alert.kind.as_str(),
                kind: alert.kind.as_str(),
                message: &alert.message,
                timestamp: reading.timestamp,
            };
            if send(mqtt, &self.alert_topic, &body) {
                info!("Published alert: {}", alert.message);
            } else {
                failed += 1;
            }
        }

        self.published = self.published.wrapping_add(1);
        sink.emit(&AppEvent::TelemetryPublished {
            alerts: raised.len(),
            failed_publishes: failed,
        });

        if failed > 0 {
            Err(Error::BrokerUnavailable(TransportError::PublishFailed))
        } else {
            Ok(())
        }
    }
}

/// Fresh reading; transient sensor failures surface as `None` fields.
fn read_sensors(hw: &mut impl SensorPort, now: Now) -> SensorReading {
    let (temperature_c, humidity_pct) = hw.read_temperature_humidity();
    SensorReading {
        temperature_c,
        humidity_pct,
        motion: hw.read_motion(),
        light_raw: hw.read_light(),
        timestamp: now.unix_secs,
    }
}

fn relay_status(hw: &impl ActuatorPort) -> RelayStatus {
    RelayStatus {
        fan: hw.is_relay_on(RelayKind::Fan),
        light: hw.is_relay_on(RelayKind::Light),
        door: hw.is_relay_on(RelayKind::Door),
    }
}

/// Serialize and publish; `false` on any failure (already logged).
fn send(mqtt: &mut impl MessagingPort, topic: &str, body: &impl Serialize) -> bool {
    let bytes = match serde_json::to_vec(body) {
        Ok(b) => b,
        Err(e) => {
            warn!("Payload for {} not serializable: {}", topic, e);
            return false;
        }
    };
    match mqtt.publish(topic, &bytes) {
        Ok(()) => true,
        Err(e) => {
            warn!("Publish to {} failed: {}", topic, e);
            false
        }
    }
}
