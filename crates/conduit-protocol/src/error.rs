//! # Error Types
//!
//! Errors raised while decoding requests or dispatching them to the bridge.

use conduit_core::error::BridgeError;
use conduit_utils::config::ConfigError;
use thiserror::Error;

/// Protocol layer error
#[derive(Error, Debug)]
pub enum ProtocolError
{
    /// The request or response could not be (de)serialized
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// The bridge rejected the request (unknown id, bad geometry, ...)
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience type alias for `Result<T, ProtocolError>`
pub type Result<T> = std::result::Result<T, ProtocolError>;
