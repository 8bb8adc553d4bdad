//! Error types for negotiation and sync sessions.

use thiserror::Error;

use inklink_wire::WireError;

/// Errors that can occur while a sync session runs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The socket failed or closed mid-session.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer violated the protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(#[from] inklink_store::StoreError),

    /// The peer went silent past the configured deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The session was cancelled locally.
    #[error("sync cancelled")]
    Cancelled,
}

impl From<WireError> for SyncError {
    fn from(e: WireError) -> Self {
        match e {
            WireError::Transport(io) => Self::Transport(io),
            WireError::Protocol(msg) => Self::Protocol(msg),
            WireError::Closed => Self::Cancelled,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
