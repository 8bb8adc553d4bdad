//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// The in-memory store cannot fail, so there are no variants today. A
/// persistent backend extends this enum with its own failure modes.
#[derive(Debug, Error)]
pub enum StoreError {}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
