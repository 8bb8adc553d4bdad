//! NoteStore trait: the abstract interface for a device's note store.
//!
//! This trait lets the sync engine run against any backend. The reference
//! implementation is in-memory; a persistent backend implements the same
//! surface.

use async_trait::async_trait;
use inklink_core::{Association, Note, Timestamp, Tombstone};

use crate::error::Result;

/// Result of upserting a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No note with this creation timestamp existed before.
    Created,
    /// An existing note with the same creation timestamp was replaced.
    Updated,
}

/// A point-in-time copy of every record set the sync engine reads.
///
/// A session operates on a snapshot taken at its start, so local edits made
/// while the session runs neither corrupt the advertised sets nor leak into
/// the wire mid-stream.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub notes: Vec<Note>,
    pub associations: Vec<Association>,
    pub tombstones: Vec<Tombstone>,
}

/// The NoteStore trait: async interface over a device's notes.
///
/// # Design Notes
///
/// - **Creation timestamps are keys**: at most one note per creation
///   timestamp; `upsert_note` replaces on collision.
/// - **Idempotent association inserts**: inserting an existing pair is not
///   an error, it reports `false`.
/// - **Deletion leaves a tombstone**: `delete_note` records the creation
///   timestamp so a later sync does not resurrect the note.
#[async_trait]
pub trait NoteStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Note Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All notes, ordered by creation timestamp.
    async fn all_notes(&self) -> Result<Vec<Note>>;

    /// Get one note by its creation timestamp.
    async fn note(&self, created: Timestamp) -> Result<Option<Note>>;

    /// Insert a note, replacing any existing note with the same creation
    /// timestamp.
    async fn upsert_note(&self, note: Note) -> Result<UpsertOutcome>;

    /// Remove a note, its incident associations, and record a tombstone.
    ///
    /// Returns `false` (and records nothing) when no such note exists.
    async fn delete_note(&self, created: Timestamp) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Association Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All parent/child associations, in insertion order.
    async fn all_associations(&self) -> Result<Vec<Association>>;

    /// Insert an association.
    ///
    /// Returns `false` when the exact pair was already present.
    async fn insert_association(&self, association: Association) -> Result<bool>;

    /// Creation timestamps of every transitive child of `created`.
    ///
    /// Breadth-first over the association graph, the root excluded. Cycles
    /// in the graph terminate (each note is visited once).
    async fn descendants(&self, created: Timestamp) -> Result<Vec<Timestamp>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Tombstone Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All deletion tombstones, ordered by creation timestamp.
    async fn all_tombstones(&self) -> Result<Vec<Tombstone>>;
}

/// Extension trait for common store patterns.
pub trait NoteStoreExt: NoteStore {
    /// Read all three record sets as one snapshot.
    fn snapshot(&self) -> impl std::future::Future<Output = Result<StoreSnapshot>> + Send;
}

impl<S: NoteStore + ?Sized> NoteStoreExt for S {
    async fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(StoreSnapshot {
            notes: self.all_notes().await?,
            associations: self.all_associations().await?,
            tombstones: self.all_tombstones().await?,
        })
    }
}
