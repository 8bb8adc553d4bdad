//! Error types for the InkLink core data model.

use thiserror::Error;

/// Errors raised while constructing or decoding core types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("timestamp field out of range: {field} = {value}")]
    TimestampOutOfRange { field: &'static str, value: u32 },

    #[error("timestamp must be {expected} bytes, got {got}")]
    TimestampLength { expected: usize, got: usize },
}
