//! PIR motion sensor (HC-SR501 style, digital output).
//!
//! The module holds its output HIGH for its own re-trigger window, so a
//! plain level read once per telemetry tick is enough.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO level via hw_init helpers.
//! On host/test: returns a value injected with [`sim_set_motion`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_MOTION: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_motion(detected: bool) {
    SIM_MOTION.store(detected, Ordering::Relaxed);
}

pub struct MotionSensor {
    gpio: i32,
}

impl MotionSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    #[cfg(target_os = "espidf")]
    pub fn detected(&self) -> bool {
        crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn detected(&self) -> bool {
        SIM_MOTION.load(Ordering::Relaxed)
    }
}
