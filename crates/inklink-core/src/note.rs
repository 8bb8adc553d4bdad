//! Note records and the relations kept alongside them.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A full note record as stored on a device and transferred during sync.
///
/// The creation timestamp is immutable and identifies the note; the last-edit
/// timestamp decides which of two copies of the same note is newer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub content: String,
    pub created: Timestamp,
    pub edited: Timestamp,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        created: Timestamp,
        edited: Timestamp,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            created,
            edited,
        }
    }

    /// The (creation, last-edit) pair advertised for this note during sync.
    pub fn stamp(&self) -> NoteStamp {
        NoteStamp {
            created: self.created,
            edited: self.edited,
        }
    }
}

/// The (creation, last-edit) timestamp pair exchanged during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteStamp {
    pub created: Timestamp,
    pub edited: Timestamp,
}

impl NoteStamp {
    pub const fn new(created: Timestamp, edited: Timestamp) -> Self {
        Self { created, edited }
    }
}

/// A parent/child link between two notes, addressed by creation timestamp.
///
/// Nothing at this layer prevents cycles; the store's recursive queries are
/// expected to cope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Association {
    pub parent: Timestamp,
    pub child: Timestamp,
}

impl Association {
    pub const fn new(parent: Timestamp, child: Timestamp) -> Self {
        Self { parent, child }
    }
}

/// A deletion marker retained after a note is removed, so a later sync does
/// not resurrect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tombstone {
    pub created: Timestamp,
}

impl Tombstone {
    pub const fn new(created: Timestamp) -> Self {
        Self { created }
    }
}
