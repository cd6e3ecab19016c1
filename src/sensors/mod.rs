//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver.  A failed climate read is logged and
//! reported as "no value" so one flaky bus transaction never aborts a
//! telemetry cycle.

pub mod dht20;
pub mod light;
pub mod motion;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, warn};

use crate::error::{Error, Result};
use dht20::Dht20;
use light::LightSensor;
use motion::MotionSensor;

/// Bring up the DHT20.  A climate sensor missing at boot is fatal; later
/// read failures only blank the reading.
pub fn init_climate<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Result<Dht20<I2C, D>> {
    Dht20::new(i2c, delay).map_err(|e| {
        error!("DHT20 init failed: {}", e);
        Error::Init("DHT20 not responding")
    })
}

pub struct SensorHub<I2C, D> {
    pub climate: Dht20<I2C, D>,
    pub light: LightSensor,
    pub motion: MotionSensor,
    climate_failures: u32,
}

impl<I2C: I2c, D: DelayNs> SensorHub<I2C, D> {
    /// Construct a new hub.  Drivers are built in main where peripheral
    /// ownership is established.
    pub fn new(climate: Dht20<I2C, D>, light: LightSensor, motion: MotionSensor) -> Self {
        Self {
            climate,
            light,
            motion,
            climate_failures: 0,
        }
    }

    /// Temperature and humidity, both `None` if the DHT20 read failed.
    pub fn read_climate(&mut self) -> (Option<f32>, Option<f32>) {
        match self.climate.read() {
            Ok(m) => (Some(m.temperature_c), Some(m.humidity_pct)),
            Err(e) => {
                self.climate_failures = self.climate_failures.wrapping_add(1);
                warn!("DHT20 read error: {} ({} so far)", e, self.climate_failures);
                (None, None)
            }
        }
    }

    /// Failed climate reads since boot.
    pub fn climate_failures(&self) -> u32 {
        self.climate_failures
    }
}
