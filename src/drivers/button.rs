//! ISR-side push-button debouncing.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The GPIO fires on the
//! falling edge; the ISR samples the level and the uptime and hands both to
//! [`ButtonDebouncer::on_edge`].  An accepted press becomes one [`Event`] in
//! the queue; the main loop does the actual relay toggle.
//!
//! | Button | GPIO | Event          |
//! |--------|------|----------------|
//! | A      | 0    | `FanButton`    |
//! | B      | 35   | `LightButton`  |

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::events::{Event, EventQueue};
use crate::pins;

/// Edges closer than this to the last accepted press are contact bounce.
pub const DEBOUNCE_MS: u32 = 50;

pub struct ButtonDebouncer {
    gpio: i32,
    event: Event,
    /// Uptime (ms, truncated) of the last accepted press.
    last_press_ms: AtomicU32,
    /// Whether any press has been accepted since boot.
    armed: AtomicBool,
}

pub static BUTTON_A: ButtonDebouncer = ButtonDebouncer::new(pins::BUTTON_A_GPIO, Event::FanButton);
pub static BUTTON_B: ButtonDebouncer =
    ButtonDebouncer::new(pins::BUTTON_B_GPIO, Event::LightButton);

impl ButtonDebouncer {
    pub const fn new(gpio: i32, event: Event) -> Self {
        Self {
            gpio,
            event,
            last_press_ms: AtomicU32::new(0),
            armed: AtomicBool::new(false),
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Handle a falling edge.  `pressed` is the sampled level (true = low).
    /// Safe to call from interrupt context.  Returns `true` if an event
    /// was queued.
    pub fn on_edge(&self, now_ms: u32, pressed: bool, queue: &EventQueue) -> bool {
        if !pressed {
            return false;
        }
        let last = self.last_press_ms.load(Ordering::Relaxed);
        if self.armed.load(Ordering::Relaxed) && now_ms.wrapping_sub(last) < DEBOUNCE_MS {
            return false;
        }
        self.last_press_ms.store(now_ms, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
        queue.push(self.event)
    }
}
