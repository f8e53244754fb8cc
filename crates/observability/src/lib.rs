//! Tracing/logging setup shared by storekeep binaries.

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init(&LogConfig::from_env());
}

/// Logging configuration (filter + output format).
pub mod config;

/// Subscriber installation.
pub mod subscriber;

pub use config::{LogConfig, LogFormat};
