//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the relay bank and the status LED, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only module in
//! the system that touches actual hardware.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::model::RelayKind;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::RelayBank;
use crate::drivers::status_led::StatusLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, D> {
    sensor_hub: SensorHub<I2C, D>,
    relays: RelayBank,
    led: StatusLed,
}

impl<I2C: I2c, D: DelayNs> HardwareAdapter<I2C, D> {
    pub fn new(sensor_hub: SensorHub<I2C, D>, relays: RelayBank, led: StatusLed) -> Self {
        Self {
            sensor_hub,
            relays,
            led,
        }
    }

    pub fn sensors(&self) -> &SensorHub<I2C, D> {
        &self.sensor_hub
    }

    pub fn status_colour(&self) -> (u8, u8, u8) {
        self.led.current_colour()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, D: DelayNs> SensorPort for HardwareAdapter<I2C, D> {
    fn read_temperature_humidity(&mut self) -> (Option<f32>, Option<f32>) {
        self.sensor_hub.read_climate()
    }

    fn read_motion(&mut self) -> bool {
        self.sensor_hub.motion.detected()
    }

    fn read_light(&mut self) -> i32 {
        self.sensor_hub.light.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c, D: DelayNs> ActuatorPort for HardwareAdapter<I2C, D> {
    fn set_relay(&mut self, kind: RelayKind, on: bool) {
        self.relays.set(kind, on);
    }

    fn is_relay_on(&self, kind: RelayKind) -> bool {
        self.relays.is_on(kind)
    }

    fn set_status_colour(&mut self, r: u8, g: u8, b: u8) {
        self.led.set_colour(r, g, b);
    }
}
