//! Interrupt-driven event queue.
//!
//! Events are produced by the push-button ISRs and consumed by the main
//! loop, which drains the queue once per iteration before touching any
//! relay.  That keeps the loop the only writer of actuator state.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button A ISR│────▶│  EventQueue  │────▶│  NodeService │
//! │ Button B ISR│────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events, one slot is kept free.
const EVENT_QUEUE_CAP: usize = 16;

/// Inputs that arrive asynchronously to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Debounced press on Button A.
    FanButton = 0,
    /// Debounced press on Button B.
    LightButton = 1,
}

impl Event {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::FanButton),
            1 => Some(Self::LightButton),
            _ => None,
        }
    }
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// One producer (ISR context), one consumer (main loop).  Slots are atomics
// so the whole queue can live in a `static` without `static mut`.

pub struct EventQueue {
    head: AtomicU8,
    tail: AtomicU8,
    buffer: [AtomicU8; EVENT_QUEUE_CAP],
    dropped: AtomicU8,
}

/// Queue fed by the button ISRs.
pub static BUTTON_EVENTS: EventQueue = EventQueue::new();

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            buffer: [const { AtomicU8::new(0) }; EVENT_QUEUE_CAP],
            dropped: AtomicU8::new(0),
        }
    }

    /// Push an event.  Safe to call from ISR context.
    /// Returns `false` if the queue is full (event dropped and counted).
    pub fn push(&self, event: Event) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

        if next_head == tail {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.buffer[head as usize].store(event as u8, Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the next event.  Main loop only.
    pub fn pop(&self) -> Option<Event> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = self.buffer[tail as usize].load(Ordering::Relaxed);
        self.tail
            .store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

        Event::from_u8(raw)
    }

    /// Drain all pending events in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed) as usize;
        let tail = self.tail.load(Ordering::Relaxed) as usize;
        (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
    }

    /// Events dropped because the queue was full; resets the counter.
    pub fn take_dropped(&self) -> u8 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
