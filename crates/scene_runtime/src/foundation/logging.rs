//! Logging utilities
//!
//! The library only ever talks to the `log` facade. Binaries and tests pick
//! the backend through these helpers.

pub use log::{debug, info, warn, error, trace};

/// Initialize `env_logger` with a filter string such as `"info"` or
/// `"scene_runtime=debug"`. `RUST_LOG` still wins when set.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(filter: &str) {
    if try_init(filter).is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}

/// Same as [`init`] but reports whether a logger was already installed
pub fn try_init(filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .parse_filters(filter)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .try_init()
}

/// Logger for unit tests: captured by the test harness, never panics on reuse
#[cfg(test)]
pub(crate) fn init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}
