//! DHT20 (AHT20 core) temperature / humidity sensor on I²C.
//!
//! ## Protocol
//!
//! | Step     | Bytes                  | Wait   |
//! |----------|------------------------|--------|
//! | Reset    | `0xBA`                 | 20 ms  |
//! | Trigger  | `0xAC 0x33 0x00`       | 80 ms  |
//! | Read     | 7 bytes: status, 5 data, CRC-8 | |
//!
//! Status bit 7 set means the measurement is still running.  CRC-8 uses
//! init `0xFF`, polynomial `0x31` over the first six bytes.  Both channels
//! are 20-bit fractions of full scale:
//!
//! ```text
//! RH  = raw_h / 2^20 * 100          (%)
//! T   = raw_t / 2^20 * 200 - 50     (°C)
//! ```
//!
//! The driver is generic over the `embedded-hal` 1.0 [`I2c`] and
//! [`DelayNs`] traits; on the device those come from `esp-idf-hal`, on the
//! host from [`SimDht20Bus`].

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const DHT20_ADDR: u8 = 0x38;

const CMD_RESET: u8 = 0xBA;
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const STATUS_BUSY: u8 = 0x80;
const FRAME_LEN: usize = 7;
const FULL_SCALE: f32 = 1_048_576.0; // 2^20

const RESET_SETTLE_MS: u32 = 20;
const POWER_UP_SETTLE_MS: u32 = 100;
const MEASURE_MS: u32 = 80;

/// One decoded measurement, both values rounded to 0.1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Dht20<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Dht20<I2C, D> {
    /// Probe the bus, soft-reset the sensor and wait for it to settle.
    pub fn new(mut i2c: I2C, mut delay: D) -> Result<Self, SensorError> {
        let mut status = [0u8; 1];
        i2c.read(DHT20_ADDR, &mut status)
            .map_err(|_| SensorError::NotFound)?;

        i2c.write(DHT20_ADDR, &[CMD_RESET])
            .map_err(|_| SensorError::Bus)?;
        delay.delay_ms(RESET_SETTLE_MS);
        delay.delay_ms(POWER_UP_SETTLE_MS);

        Ok(Self { i2c, delay })
    }

    /// Trigger a measurement, wait, read and decode it.
    pub fn read(&mut self) -> Result<Measurement, SensorError> {
        self.i2c
            .write(DHT20_ADDR, &CMD_TRIGGER)
            .map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(MEASURE_MS);

        let mut frame = [0u8; FRAME_LEN];
        self.i2c
            .read(DHT20_ADDR, &mut frame)
            .map_err(|_| SensorError::Bus)?;

        decode(&frame)
    }
}

/// CRC-8, init 0xFF, polynomial 0x31, no reflection.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Validate and decode a 7-byte frame.
pub fn decode(frame: &[u8; FRAME_LEN]) -> Result<Measurement, SensorError> {
    if frame[0] & STATUS_BUSY != 0 {
        return Err(SensorError::Busy);
    }
    if crc8(&frame[..FRAME_LEN - 1]) != frame[FRAME_LEN - 1] {
        return Err(SensorError::ChecksumMismatch);
    }

    let d = frame.map(u32::from);
    let raw_h = ((d[1] & 0x0F) << 16) | (d[2] << 8) | d[3];
    let raw_t = ((d[1] & 0xF0) >> 4) | (d[4] << 4) | (d[5] << 12);

    Ok(Measurement {
        temperature_c: round1(raw_t as f32 / FULL_SCALE * 200.0 - 50.0),
        humidity_pct: round1(raw_h as f32 / FULL_SCALE * 100.0),
    })
}

/// Build a valid frame for the given values (sim bus and tests).
pub fn encode(temperature_c: f32, humidity_pct: f32) -> [u8; FRAME_LEN] {
    let raw_h = ((humidity_pct / 100.0) * FULL_SCALE).round().clamp(0.0, FULL_SCALE - 1.0) as u32;
    let raw_t = (((temperature_c + 50.0) / 200.0) * FULL_SCALE)
        .round()
        .clamp(0.0, FULL_SCALE - 1.0) as u32;

    let mut frame = [
        0x1C, // calibrated, idle
        (((raw_t & 0x0F) << 4) | ((raw_h >> 16) & 0x0F)) as u8,
        (raw_h >> 8) as u8,
        raw_h as u8,
        (raw_t >> 4) as u8,
        (raw_t >> 12) as u8,
        0,
    ];
    frame[FRAME_LEN - 1] = crc8(&frame[..FRAME_LEN - 1]);
    frame
}

fn round1(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

// ── Host simulation ──────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::{NoopDelay, SimDht20Bus};

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::{Arc, Mutex, PoisonError};

    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

    use super::{DHT20_ADDR, FRAME_LEN, encode};

    #[derive(Debug)]
    struct SimState {
        present: bool,
        frame: [u8; FRAME_LEN],
        writes: Vec<Vec<u8>>,
    }

    /// In-memory DHT20 on a fake bus.  Clones share state, so a test can
    /// keep a handle while the driver owns the other.
    #[derive(Debug, Clone)]
    pub struct SimDht20Bus {
        state: Arc<Mutex<SimState>>,
    }

    impl Default for SimDht20Bus {
        fn default() -> Self {
            Self::new(22.0, 50.0)
        }
    }

    impl SimDht20Bus {
        pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
            Self {
                state: Arc::new(Mutex::new(SimState {
                    present: true,
                    frame: encode(temperature_c, humidity_pct),
                    writes: Vec::new(),
                })),
            }
        }

        /// A bus with nothing at the sensor address.
        pub fn absent() -> Self {
            let bus = Self::default();
            bus.with(|s| s.present = false);
            bus
        }

        pub fn set_climate(&self, temperature_c: f32, humidity_pct: f32) {
            self.with(|s| s.frame = encode(temperature_c, humidity_pct));
        }

        /// Serve an arbitrary (possibly corrupt) frame on the next reads.
        pub fn set_frame(&self, frame: [u8; FRAME_LEN]) {
            self.with(|s| s.frame = frame);
        }

        /// Every write transaction seen so far.
        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.with(|s| s.writes.clone())
        }

        fn with<R>(&self, f: impl FnOnce(&mut SimState) -> R) -> R {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        }
    }

    impl ErrorType for SimDht20Bus {
        type Error = ErrorKind;
    }

    impl I2c for SimDht20Bus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.with(|s| {
                if address != DHT20_ADDR || !s.present {
                    return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
                }
                for op in operations.iter_mut() {
                    match op {
                        Operation::Write(bytes) => s.writes.push(bytes.to_vec()),
                        Operation::Read(buf) => {
                            for (dst, src) in buf.iter_mut().zip(s.frame.iter().cycle()) {
                                *dst = *src;
                            }
                        }
                    }
                }
                Ok(())
            })
        }
    }

    /// Delay that returns immediately.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }
}
