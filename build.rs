fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link arguments are only needed for the device build; host
    // builds (tests, bench runs) have no embuild dependency.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
