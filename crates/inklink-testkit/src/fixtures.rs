//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use inklink_core::{DeviceId, Note, Timestamp};
use inklink_store::{MemoryStore, NoteStore};

/// A test fixture with a device identity and a memory store.
pub struct DeviceFixture {
    pub device: DeviceId,
    pub store: MemoryStore,
}

impl DeviceFixture {
    /// Create a fixture with a random device identity.
    pub fn new() -> Self {
        Self {
            device: DeviceId::random(),
            store: MemoryStore::new(),
        }
    }

    /// Create with a deterministic identity.
    pub fn with_device(byte: u8) -> Self {
        Self {
            device: DeviceId::from_bytes([byte; 6]),
            store: MemoryStore::new(),
        }
    }

    /// Create a fixture holding `count` distinct notes.
    pub async fn with_notes(count: usize) -> Self {
        let fixture = Self::new();
        fixture.seed_notes(0, count).await;
        fixture
    }

    /// Insert `count` distinct notes, starting at index `start`.
    pub async fn seed_notes(&self, start: usize, count: usize) {
        for i in start..start + count {
            let stamp = nth_stamp(i);
            let note = Note::new(
                format!("note {i}"),
                format!("content of note {i}"),
                stamp,
                stamp,
            );
            self.store
                .upsert_note(note)
                .await
                .expect("memory store upsert cannot fail");
        }
    }
}

impl Default for DeviceFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct deterministic identities.
pub fn multi_device_fixtures(count: usize) -> Vec<DeviceFixture> {
    (0..count)
        .map(|i| DeviceFixture::with_device(i as u8))
        .collect()
}

/// The `n`-th of a deterministic, strictly increasing run of timestamps.
///
/// Valid for `n` below one day's worth of milliseconds.
pub fn nth_stamp(n: usize) -> Timestamp {
    let n = n as u32;
    Timestamp::new(
        2024,
        1,
        1,
        (n / 3_600_000) % 24,
        (n / 60_000) % 60,
        (n / 1000) % 60,
        n % 1000,
    )
    .expect("fixture stamp fields stay in range")
}
