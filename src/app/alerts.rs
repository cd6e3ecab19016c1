//! Threshold evaluation over a single sensor reading.
//!
//! Stateless: an alert is produced only when its condition holds in the
//! reading passed in.  There is no hysteresis and no memory of previous
//! ticks.

use crate::config::Thresholds;

use super::model::{Alert, AlertKind, AlertList, SensorReading};

/// Evaluate `reading` against `thresholds`.
///
/// Order is fixed: temperature, humidity, motion.  Missing temperature or
/// humidity values never alert.
pub fn evaluate(reading: &SensorReading, thresholds: &Thresholds) -> AlertList {
    let mut alerts = AlertList::new();

    if let Some(t) = reading.temperature_c.filter(|t| *t > thresholds.temp_high_c) {
        push(&mut alerts, Alert::new(AlertKind::Temperature, t));
    }

    if let Some(h) = reading.humidity_pct {
        if h < thresholds.humidity_low_pct {
            push(&mut alerts, Alert::new(AlertKind::HumidityLow, h));
        } else if h > thresholds.humidity_high_pct {
            push(&mut alerts, Alert::new(AlertKind::HumidityHigh, h));
        }
    }

    if reading.motion {
        push(&mut alerts, Alert::new(AlertKind::Motion, 1.0));
    }

    alerts
}

/// Whether `alerts` contains a temperature alert (fan auto-on trigger).
pub fn has_temperature_alert(alerts: &[Alert]) -> bool {
    alerts.iter().any(|a| a.kind == AlertKind::Temperature)
}

fn push(alerts: &mut AlertList, alert: Alert) {
    // Capacity equals the number of condition groups, so this cannot fail.
    let _ = alerts.push(alert);
}
