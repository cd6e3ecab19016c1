//! WS2812 status LED driver.
//!
//! The Yolo:Bit carries a short WS2812 strip on one data pin.  Every pixel
//! shows the same colour.  Each pixel takes 24 bits in G-R-B order, MSB
//! first, clocked out by one RMT channel at the 800 kHz WS2812 bit rate.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: owns an `esp-idf-hal` `TxRmtDriver` and sends the frame.
//! On host/test: tracks state in-memory only.

#[cfg(target_os = "espidf")]
use core::time::Duration;

#[cfg(target_os = "espidf")]
use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
use crate::error::{Error, Result};
use crate::pins;

const BYTES_PER_PIXEL: usize = 3;

/// Bytes per strip refresh.
pub const FRAME_BYTES: usize = pins::STATUS_LED_PIXELS * BYTES_PER_PIXEL;

/// Bits per strip refresh, one RMT item each.
pub const FRAME_BITS: usize = FRAME_BYTES * 8;

/// Wire image of one refresh.
pub type Frame = [u8; FRAME_BYTES];

/// Fill every pixel with the same colour, in the strip's G-R-B byte order.
pub fn encode_frame(r: u8, g: u8, b: u8) -> Frame {
    let mut frame = [0u8; FRAME_BYTES];
    for pixel in frame.chunks_exact_mut(BYTES_PER_PIXEL) {
        pixel.copy_from_slice(&[g, r, b]);
    }
    frame
}

/// Bit `index` of the frame in transmission order (MSB of byte 0 first).
pub fn frame_bit(frame: &Frame, index: usize) -> bool {
    frame[index / 8] & (0x80 >> (index % 8)) != 0
}

// WS2812 bit timings.
#[cfg(target_os = "espidf")]
const T0H: Duration = Duration::from_nanos(350);
#[cfg(target_os = "espidf")]
const T0L: Duration = Duration::from_nanos(800);
#[cfg(target_os = "espidf")]
const T1H: Duration = Duration::from_nanos(700);
#[cfg(target_os = "espidf")]
const T1L: Duration = Duration::from_nanos(600);

pub struct StatusLed {
    current: (u8, u8, u8),
    #[cfg(target_os = "espidf")]
    tx: TxRmtDriver<'static>,
    /// (high, low) pulse pairs for a 0 bit and a 1 bit.
    #[cfg(target_os = "espidf")]
    zero: (Pulse, Pulse),
    #[cfg(target_os = "espidf")]
    one: (Pulse, Pulse),
}

#[cfg(not(target_os = "espidf"))]
impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    /// Take the RMT channel wired to the strip's data pin.  The pixels stay
    /// at their power-on state until the first `set_colour`.
    #[cfg(target_os = "espidf")]
    pub fn new(tx: TxRmtDriver<'static>) -> Result<Self> {
        let clock = tx
            .counter_clock()
            .map_err(|_| Error::Init("status LED RMT clock"))?;
        let pulse = |state, width: &Duration| {
            Pulse::new_with_duration(clock, state, width)
                .map_err(|_| Error::Init("status LED pulse timing"))
        };
        Ok(Self {
            current: (0, 0, 0),
            zero: (pulse(PinState::High, &T0H)?, pulse(PinState::Low, &T0L)?),
            one: (pulse(PinState::High, &T1H)?, pulse(PinState::Low, &T1L)?),
            tx,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self { current: (0, 0, 0) }
    }

    /// Skips the refresh when the colour is unchanged.
    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        if self.current == (r, g, b) {
            return;
        }
        if self.write_frame(&encode_frame(r, g, b)) {
            self.current = (r, g, b);
        }
    }

    pub fn current_colour(&self) -> (u8, u8, u8) {
        self.current
    }

    /// A failed refresh leaves `current` stale so the next change retries.
    #[cfg(target_os = "espidf")]
    fn write_frame(&mut self, frame: &Frame) -> bool {
        let mut signal = FixedLengthSignal::<FRAME_BITS>::new();
        for index in 0..FRAME_BITS {
            let pair = if frame_bit(frame, index) {
                &self.one
            } else {
                &self.zero
            };
            if let Err(e) = signal.set(index, pair) {
                warn!("Status LED: signal build failed ({})", e);
                return false;
            }
        }
        match self.tx.start_blocking(&signal) {
            Ok(()) => true,
            Err(e) => {
                warn!("Status LED: RMT send failed ({})", e);
                false
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_frame(&mut self, _frame: &Frame) -> bool {
        true
    }
}
