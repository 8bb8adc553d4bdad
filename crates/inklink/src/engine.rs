//! The Engine: unified API for a note-syncing device.
//!
//! The Engine brings together a note store, connection negotiation and the
//! sync session into one interface an application drives.

use std::sync::Arc;
use std::time::Duration;

use inklink_core::{Association, DeviceId, Note, Timestamp};
use inklink_store::NoteStore;
use inklink_sync::{
    CancelToken, Connector, NegotiateConfig, Negotiator, SessionConfig, SyncReport, SyncSession,
};

use crate::error::{EngineError, Result};

/// Configuration for the Engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Connection negotiation tuning.
    pub negotiate: NegotiateConfig,
    /// Sync session tuning.
    pub session: SessionConfig,
}

/// One device's view of its notes and its peers.
pub struct Engine<S> {
    /// This device's identity, used to break negotiation ties.
    device: DeviceId,
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: EngineConfig,
}

impl<S: NoteStore> Engine<S> {
    /// Create a new engine instance.
    pub fn new(store: S, device: DeviceId, config: EngineConfig) -> Self {
        Self {
            device,
            store: Arc::new(store),
            config,
        }
    }

    /// This device's identity.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Note Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a note stamped with the current instant.
    ///
    /// The creation instant is the note's identity for life. If a note was
    /// already created within the current millisecond, waits for the next
    /// one rather than silently replacing it.
    pub async fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note> {
        let title = title.into();
        let content = content.into();
        loop {
            let now = Timestamp::now();
            if self.store.note(now).await?.is_none() {
                let note = Note::new(title, content, now, now);
                self.store.upsert_note(note.clone()).await?;
                return Ok(note);
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Replace a note's text and move its last-edit stamp to now.
    pub async fn edit_note(
        &self,
        created: Timestamp,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note> {
        if self.store.note(created).await?.is_none() {
            return Err(EngineError::NoteNotFound(created));
        }
        let note = Note::new(title, content, created, Timestamp::now());
        self.store.upsert_note(note.clone()).await?;
        Ok(note)
    }

    /// Delete a note, leaving a tombstone so no peer brings it back.
    ///
    /// Returns `false` when no such note exists.
    pub async fn delete_note(&self, created: Timestamp) -> Result<bool> {
        Ok(self.store.delete_note(created).await?)
    }

    /// All notes, ordered by creation.
    pub async fn notes(&self) -> Result<Vec<Note>> {
        Ok(self.store.all_notes().await?)
    }

    /// One note by its creation timestamp.
    pub async fn note(&self, created: Timestamp) -> Result<Option<Note>> {
        Ok(self.store.note(created).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Association Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Link `child` under `parent`. Both notes must exist.
    ///
    /// Returns `false` when the link was already present.
    pub async fn associate(&self, parent: Timestamp, child: Timestamp) -> Result<bool> {
        for created in [parent, child] {
            if self.store.note(created).await?.is_none() {
                return Err(EngineError::NoteNotFound(created));
            }
        }
        Ok(self
            .store
            .insert_association(Association::new(parent, child))
            .await?)
    }

    /// Creation timestamps of every transitive child of `created`.
    pub async fn descendants(&self, created: Timestamp) -> Result<Vec<Timestamp>> {
        Ok(self.store.descendants(created).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Negotiate a connection to `peer` through `connector`, then run a full
    /// sync session over it.
    pub async fn sync_with<C: Connector>(
        &self,
        connector: &C,
        peer: DeviceId,
        cancel: &CancelToken,
    ) -> Result<SyncReport> {
        tracing::info!(%peer, "negotiating connection");
        let negotiator = Negotiator::new(connector, self.device, self.config.negotiate.clone());
        let socket = negotiator.connect(peer, cancel).await?;

        tracing::info!(%peer, "connected, starting sync session");
        let session = SyncSession::new(self.store.as_ref(), self.config.session.clone());
        let report = session.run(socket, cancel).await?;
        Ok(report)
    }
}
