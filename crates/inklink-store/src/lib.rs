//! # InkLink Store
//!
//! Storage abstraction for InkLink. Provides a trait-based interface over a
//! device's note store so the sync engine stays storage-agnostic.
//!
//! ## Overview
//!
//! The sync engine only ever reads whole record sets (notes, associations,
//! tombstones) at session start and writes records back after a successful
//! session. The [`NoteStore`] trait captures exactly that surface plus the
//! local CRUD a device needs between syncs.
//!
//! ## Key Types
//!
//! - [`NoteStore`] - The async trait for all storage operations
//! - [`MemoryStore`] - In-memory storage, the reference implementation
//! - [`StoreSnapshot`] - Point-in-time copy of every record set
//! - [`UpsertOutcome`] - Whether an upsert created or replaced a note
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inklink_core::{Note, Timestamp};
//! use inklink_store::{MemoryStore, NoteStore};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let created = Timestamp::now();
//!     store
//!         .upsert_note(Note::new("shopping", "milk, eggs", created, created))
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{NoteStore, NoteStoreExt, StoreSnapshot, UpsertOutcome};
