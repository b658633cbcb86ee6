fn main() {
    // Propagates the ESP-IDF build environment (cfg flags, link args) when
    // building for the device; emits nothing on host builds.
    embuild::espidf::sysenv::output();
}
