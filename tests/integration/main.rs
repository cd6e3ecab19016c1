//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware or broker required.

mod dispatcher_tests;
mod mock_hw;
#[cfg(not(target_os = "espidf"))]
mod mqtt_host_tests;
mod service_tests;
mod supervisor_tests;
mod telemetry_tests;
