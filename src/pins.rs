//! GPIO / peripheral pin assignments for the YoloHome node (ESP32).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Relays (active HIGH)
// ---------------------------------------------------------------------------

pub const RELAY_FAN_GPIO: i32 = 26;
pub const RELAY_LIGHT_GPIO: i32 = 27;
/// Door strike: HIGH = unlocked.
pub const RELAY_DOOR_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// PIR motion sensor output.  HIGH = motion.
pub const PIR_GPIO: i32 = 13;

/// LDR voltage divider.  GPIO 34 is ADC1 channel 6 on the ESP32.
pub const LIGHT_ADC_GPIO: i32 = 34;
pub const LIGHT_ADC_CHANNEL: u32 = 6;

/// DHT20 on I²C0.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Status LED (WS2812 strip, RMT channel 0)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 15;
/// Pixels on the strip; all show the status colour.
pub const STATUS_LED_PIXELS: usize = 4;

// ---------------------------------------------------------------------------
// User buttons (active-low)
// ---------------------------------------------------------------------------

/// Button A, toggles the fan.  Internal pull-up enabled.
pub const BUTTON_A_GPIO: i32 = 0;
/// Button B, toggles the light.  Input-only pin, external pull-up.
pub const BUTTON_B_GPIO: i32 = 35;
