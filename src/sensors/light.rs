//! LDR light sensor on ADC1.
//!
//! The LDR sits on the high side of a divider, so the raw 12-bit value
//! rises as the room gets darker.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: oneshot ADC read via hw_init helpers.
//! On host/test: returns a value injected with [`sim_set_light`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

use log::warn;

pub const ADC_MAX: i32 = 4095;

#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT_RAW: AtomicI32 = AtomicI32::new(1200);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light(raw: i32) {
    SIM_LIGHT_RAW.store(raw.clamp(0, ADC_MAX), Ordering::Relaxed);
}

pub struct LightSensor {
    channel: u32,
    last_raw: i32,
}

impl LightSensor {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            last_raw: 0,
        }
    }

    /// Raw ADC value, 0-4095.  A failed conversion repeats the last value.
    pub fn read(&mut self) -> i32 {
        match self.read_hw() {
            Some(raw) => self.last_raw = raw,
            None => warn!("Light ADC CH{} read failed, reusing {}", self.channel, self.last_raw),
        }
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_hw(&self) -> Option<i32> {
        crate::drivers::hw_init::adc1_read(self.channel).map(i32::from)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_hw(&self) -> Option<i32> {
        Some(SIM_LIGHT_RAW.load(Ordering::Relaxed))
    }
}
