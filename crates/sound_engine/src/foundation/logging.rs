//! Logging setup
//!
//! The library only emits through the `log` facade. Binaries call one of the
//! initializers below to route records through `env_logger`.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize logging from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default level, still overridable by `RUST_LOG`
pub fn init_with_level(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
