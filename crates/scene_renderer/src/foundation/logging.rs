//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with a default level.
///
/// `RUST_LOG` still overrides per-module filters. Calling this more than once
/// is harmless; later calls are ignored.
pub fn init(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

/// Parse a textual log level such as `"info"` or `"debug"`.
///
/// Unknown names fall back to `Info`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}
