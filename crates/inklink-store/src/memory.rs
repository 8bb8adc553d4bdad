//! In-memory implementation of the NoteStore trait.
//!
//! The reference backend, used directly on devices without persistence and
//! throughout the test suites. Thread-safe via RwLock.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;

use inklink_core::{Association, Note, Timestamp, Tombstone};

use crate::error::Result;
use crate::traits::{NoteStore, UpsertOutcome};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Notes keyed by creation timestamp.
    notes: BTreeMap<Timestamp, Note>,

    /// Parent/child links in insertion order.
    associations: Vec<Association>,

    /// Creation timestamps of deleted notes.
    tombstones: BTreeSet<Timestamp>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                notes: BTreeMap::new(),
                associations: Vec::new(),
                tombstones: BTreeSet::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn all_notes(&self) -> Result<Vec<Note>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.notes.values().cloned().collect())
    }

    async fn note(&self, created: Timestamp) -> Result<Option<Note>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.notes.get(&created).cloned())
    }

    async fn upsert_note(&self, note: Note) -> Result<UpsertOutcome> {
        let mut inner = self.inner.write().unwrap();
        match inner.notes.insert(note.created, note) {
            Some(_) => Ok(UpsertOutcome::Updated),
            None => Ok(UpsertOutcome::Created),
        }
    }

    async fn delete_note(&self, created: Timestamp) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();

        if inner.notes.remove(&created).is_none() {
            return Ok(false);
        }

        inner
            .associations
            .retain(|a| a.parent != created && a.child != created);
        inner.tombstones.insert(created);

        Ok(true)
    }

    async fn all_associations(&self) -> Result<Vec<Association>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.associations.clone())
    }

    async fn insert_association(&self, association: Association) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();

        if inner.associations.contains(&association) {
            return Ok(false);
        }

        inner.associations.push(association);
        Ok(true)
    }

    async fn descendants(&self, created: Timestamp) -> Result<Vec<Timestamp>> {
        let inner = self.inner.read().unwrap();

        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([created]);
        visited.insert(created);

        while let Some(parent) = queue.pop_front() {
            for assoc in inner.associations.iter().filter(|a| a.parent == parent) {
                if visited.insert(assoc.child) {
                    found.push(assoc.child);
                    queue.push_back(assoc.child);
                }
            }
        }

        Ok(found)
    }

    async fn all_tombstones(&self) -> Result<Vec<Tombstone>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.tombstones.iter().copied().map(Tombstone::new).collect())
    }
}
