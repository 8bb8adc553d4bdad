//! Error types for the Engine.

use thiserror::Error;

use inklink_core::Timestamp;
use inklink_store::StoreError;
use inklink_sync::{NegotiateError, SyncError};

/// Errors that can occur during Engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection negotiation failed.
    #[error("negotiation error: {0}")]
    Negotiate(#[from] NegotiateError),

    /// The sync session failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// No note with this creation timestamp.
    #[error("note not found: {0}")]
    NoteNotFound(Timestamp),
}

/// Result type for Engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
