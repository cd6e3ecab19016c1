//! Device identity derived from the ESP32 factory MAC address.
//!
//! Used only when no `device_id` is configured.  Produces a stable id in
//! the form `yolobit-xxyyzz` (last 3 bytes of the 6-byte MAC, lowercase
//! hex), which is safe to use as an MQTT topic segment.

use core::fmt::Write;

/// Fixed-size device ID string: "yolobit-xxyyzz" (14 chars).
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "yolobit-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}
