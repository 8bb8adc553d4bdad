//! Error types for the wire layer.

use thiserror::Error;

use inklink_core::CoreError;

/// Errors crossing the framed channel.
#[derive(Debug, Error)]
pub enum WireError {
    /// The transport failed or the peer closed the connection.
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer violated the framing protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The channel was torn down while a sender was waiting.
    #[error("channel closed")]
    Closed,
}

impl WireError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<CoreError> for WireError {
    fn from(e: CoreError) -> Self {
        Self::Protocol(e.to_string())
    }
}

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;
