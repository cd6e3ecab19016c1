//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                   |
//! |-------------|----------------|-------------------------------|
//! | `hardware`  | SensorPort     | DHT20 (I²C), ADC, PIR GPIO    |
//! |             | ActuatorPort   | Relay GPIOs, WS2812 (RMT)     |
//! | `wifi`      | NetworkPort    | ESP-IDF WiFi STA              |
//! | `mqtt`      | MessagingPort  | EspMqttClient / rumqttc       |
//! | `log_sink`  | EventSink      | Serial log output             |
//! | `time`      | (clock)        | ESP32 system timer, RTC       |
//! | `device_id` | (identity)     | Factory MAC eFuse             |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub(crate) mod utils;
pub mod wifi;
