//! Command: print version information.

/// Version string baked in at build time, or the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("LOGBUS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the logbus version to stdout.
pub fn run() {
    println!("logbus {}", version());
}
