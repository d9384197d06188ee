fn main() {
    // Propagate ESP-IDF link arguments only when cross-compiling for the
    // device; host builds (tests, tooling) must not inherit them.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
