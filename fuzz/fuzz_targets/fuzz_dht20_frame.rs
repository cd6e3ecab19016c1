//! Fuzz target: DHT20 frame `decode`
//!
//! Feeds arbitrary 7-byte frames to the decoder and checks that accepted
//! frames decode inside the sensor's physical range.
//!
//! cargo fuzz run fuzz_dht20_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolohome::sensors::dht20::{crc8, decode};

fuzz_target!(|data: [u8; 7]| {
    if let Ok(m) = decode(&data) {
        assert_eq!(crc8(&data[..6]), data[6]);
        assert!((-50.0..=150.0).contains(&m.temperature_c));
        assert!((0.0..=100.0).contains(&m.humidity_pct));
    }
});
