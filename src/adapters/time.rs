//! ESP32 time adapter.
//!
//! Samples the two clocks the node needs once per loop iteration.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for the monotonic
//!   clock, `gettimeofday()` for wall-clock seconds.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `SystemTime` for host-side runs.

use crate::app::model::Now;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    pub fn now(&self) -> Now {
        Now {
            uptime_ms: self.uptime_ms(),
            unix_secs: self.unix_secs(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Wall-clock seconds since the Unix epoch.  Counts from boot until
    /// something sets the RTC.
    #[cfg(target_os = "espidf")]
    pub fn unix_secs(&self) -> u64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec.max(0) as u64
    }

    /// Wall-clock seconds since the Unix epoch.
    #[cfg(not(target_os = "espidf"))]
    pub fn unix_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}
