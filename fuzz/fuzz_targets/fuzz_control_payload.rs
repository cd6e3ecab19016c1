//! Fuzz target: `parse_command`
//!
//! Drives arbitrary bytes through the control-topic parser and asserts
//! that it never panics and only yields a command for well-formed input.
//!
//! cargo fuzz run fuzz_control_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolohome::app::dispatcher::parse_command;
use yolohome::app::model::RelayKind;

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = parse_command(data) {
        // A parsed command must round-trip through its wire name.
        assert_eq!(RelayKind::from_wire(cmd.device_type.as_str()), Some(cmd.device_type));
        // Anything that parsed was valid UTF-8 JSON.
        assert!(core::str::from_utf8(data).is_ok());
    }
});
