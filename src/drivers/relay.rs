//! Relay bank driver (fan, light, door strike).
//!
//! Each relay is a plain active-HIGH GPIO output.  The driver remembers
//! the last commanded level, which is what the rest of the firmware reports
//! as relay state; there is no read-back from the coil.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIOs via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::app::model::RelayKind;
use crate::drivers::hw_init;
use crate::pins;

pub struct RelayBank {
    fan: bool,
    light: bool,
    door: bool,
}

impl Default for RelayBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayBank {
    /// All relays off (door locked), matching the boot level set by hw_init.
    pub fn new() -> Self {
        Self {
            fan: false,
            light: false,
            door: false,
        }
    }

    pub fn set(&mut self, kind: RelayKind, on: bool) {
        hw_init::gpio_write(gpio_for(kind), on);
        *self.slot(kind) = on;
    }

    pub fn is_on(&self, kind: RelayKind) -> bool {
        match kind {
            RelayKind::Fan => self.fan,
            RelayKind::Light => self.light,
            RelayKind::Door => self.door,
        }
    }

    fn slot(&mut self, kind: RelayKind) -> &mut bool {
        match kind {
            RelayKind::Fan => &mut self.fan,
            RelayKind::Light => &mut self.light,
            RelayKind::Door => &mut self.door,
        }
    }
}

fn gpio_for(kind: RelayKind) -> i32 {
    match kind {
        RelayKind::Fan => pins::RELAY_FAN_GPIO,
        RelayKind::Light => pins::RELAY_LIGHT_GPIO,
        RelayKind::Door => pins::RELAY_DOOR_GPIO,
    }
}
