//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`], the hexagonal boundary for the link that
//! sits underneath the broker session.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulated link for host-side tests and bench runs.
//!
//! ## Bounded wait
//!
//! `connect()` polls the association state once per second for at most
//! `connect_polls` seconds and then gives up with [`NetworkError::Timeout`].
//! Retrying is the supervisor's job, not the adapter's.

use log::{error, info, warn};

use crate::adapters::utils::is_printable_ascii;
use crate::app::ports::{NetworkError, NetworkPort};

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

const POLL_PERIOD_MS: u32 = 1000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

pub fn validate_ssid(ssid: &str) -> Result<(), NetworkError> {
    if ssid.is_empty() {
        return Err(NetworkError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(NetworkError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), NetworkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(NetworkError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Simulation: whether the access point answers.  Cleared by tests and
/// bench runs to force a link drop or a connect timeout.
#[cfg(not(target_os = "espidf"))]
static SIM_AP_REACHABLE: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ap_reachable(reachable: bool) {
    SIM_AP_REACHABLE.store(reachable, Ordering::Relaxed);
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    connect_polls: u8,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    associated: bool,
}

impl WifiAdapter {
    /// Validate credentials and take ownership of the driver.  Nothing is
    /// started until the first `connect()`.
    #[cfg(target_os = "espidf")]
    pub fn new(
        wifi: EspWifi<'static>,
        ssid: &str,
        password: &str,
        connect_polls: u8,
    ) -> Result<Self, NetworkError> {
        let (ssid, password) = credentials(ssid, password)?;
        Ok(Self {
            ssid,
            password,
            connect_polls,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str, connect_polls: u8) -> Result<Self, NetworkError> {
        let (ssid, password) = credentials(ssid, password)?;
        Ok(Self {
            ssid,
            password,
            connect_polls,
            associated: false,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), NetworkError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| NetworkError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| NetworkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&conf).map_err(|e| {
            error!("WiFi: set_configuration failed ({})", e);
            NetworkError::Driver
        })?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| {
                error!("WiFi: start failed ({})", e);
                NetworkError::Driver
            })?;
        }
        self.wifi.connect().map_err(|e| {
            error!("WiFi: connect request failed ({})", e);
            NetworkError::Driver
        })?;

        for _ in 0..self.connect_polls {
            if self.platform_is_connected() {
                return Ok(());
            }
            FreeRtos::delay_ms(POLL_PERIOD_MS);
        }
        // Abort the pending association so the next attempt starts from idle.
        self.platform_disconnect();
        Err(NetworkError::Timeout)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), NetworkError> {
        if !SIM_AP_REACHABLE.load(Ordering::Relaxed) {
            warn!(
                "WiFi(sim): '{}' not reachable after {} polls of {} ms",
                self.ssid, self.connect_polls, POLL_PERIOD_MS
            );
            return Err(NetworkError::Timeout);
        }
        self.associated = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect returned {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.associated = false;
    }

    /// Associated and holding an IP lease.
    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.associated && SIM_AP_REACHABLE.load(Ordering::Relaxed)
    }
}

fn credentials(
    ssid: &str,
    password: &str,
) -> Result<(heapless::String<32>, heapless::String<64>), NetworkError> {
    validate_ssid(ssid)?;
    validate_password(password)?;
    let mut s = heapless::String::new();
    s.push_str(ssid).map_err(|_| NetworkError::InvalidSsid)?;
    let mut p = heapless::String::new();
    p.push_str(password).map_err(|_| NetworkError::InvalidPassword)?;
    Ok((s, p))
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), NetworkError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
