//! # Conduit Utilities
//!
//! Shared utilities, logging, and config for Conduit.
//!
//! This crate provides common functionality used across the Conduit workspace,
//! including logging infrastructure built on `tracing` and environment-driven
//! bridge configuration.

pub mod config;
pub mod logging;

pub use config::{BridgeConfig, ConfigError};
// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_file_only, init_logging_with, init_logging_with_level, LogFormat, LogLevel,
    LogSettings, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
