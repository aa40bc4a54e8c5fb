//! # rmem Utilities
//!
//! Shared helpers for applications built on `rmem-core`.
//!
//! Currently this is the logging setup: `rmem-core` emits `tracing` events
//! for every transfer and handle change, and this crate installs the
//! subscriber that prints or stores them.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with_config, init_logging_with_level, LogConfig, LogFormat, LogLevel, LoggingError,
    LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
