//! Node configuration parameters
//!
//! All tunable parameters for the YoloHome node.  Defaults match the
//! factory firmware; any field can be overridden through `YOLOHOME_*` keys
//! (process environment on a host build, compile-time environment on the
//! device).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Alert thresholds applied to every telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Temperature (°C) above which an alert fires and the fan is forced on
    pub temp_high_c: f32,
    /// Relative humidity (%) below which a low-humidity alert fires
    pub humidity_low_pct: f32,
    /// Relative humidity (%) above which a high-humidity alert fires
    pub humidity_high_pct: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_high_c: 30.0,
            humidity_low_pct: 30.0,
            humidity_high_pct: 70.0,
        }
    }
}

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- WiFi ---
    pub wifi_ssid: String,
    /// Empty for an open network
    pub wifi_password: String,
    /// Link polls (1 s apart) before a connect attempt times out
    pub wifi_connect_polls: u8,

    // --- MQTT ---
    pub mqtt_host: String,
    pub mqtt_port: u16,
    /// Client-id prefix; the full id is `{prefix}_{device_id}`
    pub mqtt_client_id: String,
    /// Empty disables authentication
    pub mqtt_user: String,
    pub mqtt_password: String,
    pub mqtt_keepalive_secs: u16,

    // --- Identity ---
    /// Empty means "derive from the factory MAC at boot"
    pub device_id: String,

    // --- Alerts ---
    pub thresholds: Thresholds,

    // --- Timing ---
    /// Telemetry publish interval (milliseconds)
    pub publish_interval_ms: u32,
    /// Minimum gap between reconnect attempts (milliseconds)
    pub reconnect_interval_ms: u32,
    /// Main loop period (milliseconds)
    pub poll_period_ms: u32,
    /// Pause after a non-link error (milliseconds)
    pub fault_backoff_ms: u32,
    /// Inbound messages dispatched per loop iteration
    pub max_inbound_per_poll: u8,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // WiFi
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            wifi_connect_polls: 20,

            // MQTT
            mqtt_host: "localhost".to_string(),
            mqtt_port: 1883,
            mqtt_client_id: "yolohome".to_string(),
            mqtt_user: String::new(),
            mqtt_password: String::new(),
            mqtt_keepalive_secs: 30,

            // Identity
            device_id: "yolobit1".to_string(),

            thresholds: Thresholds::default(),

            // Timing
            publish_interval_ms: 10_000,  // 0.1 Hz
            reconnect_interval_ms: 5_000, // 0.2 Hz
            poll_period_ms: 100,          // 10 Hz
            fault_backoff_ms: 5_000,
            max_inbound_per_poll: 8,
        }
    }
}

impl NodeConfig {
    /// Build a configuration from defaults plus whatever `lookup` returns
    /// for each `YOLOHOME_*` key.  Does not validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut c = Self::default();

        if let Some(v) = lookup("YOLOHOME_WIFI_SSID") {
            c.wifi_ssid = v;
        }
        if let Some(v) = lookup("YOLOHOME_WIFI_PASSWORD") {
            c.wifi_password = v;
        }
        if let Some(v) = lookup("YOLOHOME_MQTT_HOST") {
            c.mqtt_host = v;
        }
        if let Some(v) = lookup("YOLOHOME_MQTT_PORT") {
            c.mqtt_port = parse(&v, "YOLOHOME_MQTT_PORT is not a port number")?;
        }
        if let Some(v) = lookup("YOLOHOME_MQTT_CLIENT_ID") {
            c.mqtt_client_id = v;
        }
        if let Some(v) = lookup("YOLOHOME_MQTT_USER") {
            c.mqtt_user = v;
        }
        if let Some(v) = lookup("YOLOHOME_MQTT_PASSWORD") {
            c.mqtt_password = v;
        }
        if let Some(v) = lookup("YOLOHOME_DEVICE_ID") {
            c.device_id = v;
        }
        if let Some(v) = lookup("YOLOHOME_TEMP_HIGH") {
            c.thresholds.temp_high_c = parse(&v, "YOLOHOME_TEMP_HIGH is not a number")?;
        }
        if let Some(v) = lookup("YOLOHOME_HUMIDITY_LOW") {
            c.thresholds.humidity_low_pct = parse(&v, "YOLOHOME_HUMIDITY_LOW is not a number")?;
        }
        if let Some(v) = lookup("YOLOHOME_HUMIDITY_HIGH") {
            c.thresholds.humidity_high_pct = parse(&v, "YOLOHOME_HUMIDITY_HIGH is not a number")?;
        }
        if let Some(v) = lookup("YOLOHOME_PUBLISH_INTERVAL_MS") {
            c.publish_interval_ms = parse(&v, "YOLOHOME_PUBLISH_INTERVAL_MS is not an integer")?;
        }
        if let Some(v) = lookup("YOLOHOME_RECONNECT_INTERVAL_MS") {
            c.reconnect_interval_ms =
                parse(&v, "YOLOHOME_RECONNECT_INTERVAL_MS is not an integer")?;
        }

        Ok(c)
    }

    /// Load overrides from the environment of the current target.
    pub fn load() -> Result<Self> {
        #[cfg(target_os = "espidf")]
        {
            Self::from_lookup(build_env)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            Self::from_lookup(|key| std::env::var(key).ok())
        }
    }

    /// Range checks; call after the device id has been resolved.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.temp_high_c.is_finite() && t.humidity_low_pct.is_finite() && t.humidity_high_pct.is_finite()) {
            return Err(Error::Config("thresholds must be finite"));
        }
        if t.humidity_low_pct >= t.humidity_high_pct {
            return Err(Error::Config("humidity low threshold must be below high threshold"));
        }
        if self.publish_interval_ms == 0 || self.reconnect_interval_ms == 0 || self.poll_period_ms == 0 {
            return Err(Error::Config("intervals must be non-zero"));
        }
        if self.wifi_connect_polls == 0 || self.max_inbound_per_poll == 0 {
            return Err(Error::Config("poll counts must be non-zero"));
        }
        if self.mqtt_host.is_empty() {
            return Err(Error::Config("MQTT host is empty"));
        }
        if self.mqtt_port == 0 {
            return Err(Error::Config("MQTT port is zero"));
        }
        if !is_topic_segment(&self.device_id) {
            return Err(Error::Config(
                "device id must be printable ASCII without '/', '+' or '#'",
            ));
        }
        if !is_topic_segment(&self.mqtt_client_id) {
            return Err(Error::Config(
                "client id prefix must be printable ASCII without '/', '+' or '#'",
            ));
        }
        Ok(())
    }
}

fn parse<T: core::str::FromStr>(raw: &str, msg: &'static str) -> Result<T> {
    raw.trim().parse().map_err(|_| Error::Config(msg))
}

/// A non-empty string usable as one MQTT topic level.
fn is_topic_segment(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && crate::adapters::utils::is_printable_ascii(s)
        && !s.contains(['/', '+', '#', ' '])
}

/// Compile-time overrides baked into the device image.
#[cfg(target_os = "espidf")]
fn build_env(key: &str) -> Option<String> {
    let v = match key {
        "YOLOHOME_WIFI_SSID" => option_env!("YOLOHOME_WIFI_SSID"),
        "YOLOHOME_WIFI_PASSWORD" => option_env!("YOLOHOME_WIFI_PASSWORD"),
        "YOLOHOME_MQTT_HOST" => option_env!("YOLOHOME_MQTT_HOST"),
        "YOLOHOME_MQTT_PORT" => option_env!("YOLOHOME_MQTT_PORT"),
        "YOLOHOME_MQTT_CLIENT_ID" => option_env!("YOLOHOME_MQTT_CLIENT_ID"),
        "YOLOHOME_MQTT_USER" => option_env!("YOLOHOME_MQTT_USER"),
        "YOLOHOME_MQTT_PASSWORD" => option_env!("YOLOHOME_MQTT_PASSWORD"),
        "YOLOHOME_DEVICE_ID" => option_env!("YOLOHOME_DEVICE_ID"),
        "YOLOHOME_TEMP_HIGH" => option_env!("YOLOHOME_TEMP_HIGH"),
        "YOLOHOME_HUMIDITY_LOW" => option_env!("YOLOHOME_HUMIDITY_LOW"),
        "YOLOHOME_HUMIDITY_HIGH" => option_env!("YOLOHOME_HUMIDITY_HIGH"),
        "YOLOHOME_PUBLISH_INTERVAL_MS" => option_env!("YOLOHOME_PUBLISH_INTERVAL_MS"),
        "YOLOHOME_RECONNECT_INTERVAL_MS" => option_env!("YOLOHOME_RECONNECT_INTERVAL_MS"),
        _ => None,
    };
    v.map(str::to_string)
}
