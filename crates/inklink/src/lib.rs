//! # InkLink
//!
//! The unified API for InkLink - peer-to-peer note synchronization with
//! last-writer-wins merging and tombstoned deletes.
//!
//! ## Overview
//!
//! InkLink keeps one person's notes identical across their devices without
//! a server. Every note is identified by its creation instant; edits move a
//! last-edit stamp, and whichever copy was edited last wins. Deleting a
//! note leaves a tombstone so no peer ever brings it back.
//!
//! ## Key Concepts
//!
//! - **Note**: Title and content, keyed by creation timestamp.
//! - **Stamp pair**: The (creation, last-edit) pair advertised during sync.
//! - **Tombstone**: A deletion marker that outlives its note.
//! - **Negotiation**: Two devices dialing each other collapse to one socket.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inklink::{Engine, EngineConfig};
//! use inklink::store::MemoryStore;
//! use inklink::core::DeviceId;
//! use inklink::sync::{CancelToken, TcpConnector};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let engine = Engine::new(MemoryStore::new(), DeviceId::random(), EngineConfig::default());
//!     let note = engine.create_note("groceries", "milk, eggs").await?;
//!     println!("created {}", note.created);
//!
//!     let connector = TcpConnector::bind(
//!         "0.0.0.0:4040".parse()?,
//!         "192.168.1.17:4040".parse()?,
//!     )
//!     .await?;
//!     let peer = DeviceId::from_bytes([0x17; 6]);
//!     let cancel = CancelToken::new();
//!     let report = engine.sync_with(&connector, peer, &cancel).await?;
//!     println!("received {} notes", report.notes_received);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `inklink::core` - Data model (Timestamp, Note, DeviceId, ...)
//! - `inklink::store` - Storage abstraction and the in-memory store
//! - `inklink::wire` - Binary wire protocol
//! - `inklink::sync` - Negotiation and the sync session

pub mod engine;
pub mod error;

// Re-export component crates
pub use inklink_core as core;
pub use inklink_store as store;
pub use inklink_sync as sync;
pub use inklink_wire as wire;

// Re-export main types for convenience
pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, Result};

// Re-export commonly used component types
pub use inklink_core::{Association, DeviceId, Note, NoteStamp, Timestamp, Tombstone};
pub use inklink_store::{MemoryStore, NoteStore, StoreSnapshot, UpsertOutcome};
pub use inklink_sync::{CancelToken, SyncReport, TcpConnector};
