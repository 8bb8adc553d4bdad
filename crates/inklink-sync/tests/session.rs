//! End-to-end session tests: two stores, one duplex pipe.

use std::time::Duration;

use inklink_core::{Association, Note, Timestamp};
use inklink_store::{MemoryStore, NoteStore};
use inklink_sync::{CancelToken, SessionConfig, SyncError, SyncReport, SyncSession};

fn ts(milli: u32) -> Timestamp {
    Timestamp::new(2024, 5, 20, 12, 0, 0, milli).unwrap()
}

async fn run_pair_with(
    store_a: &MemoryStore,
    store_b: &MemoryStore,
    config: SessionConfig,
) -> (SyncReport, SyncReport) {
    let (sock_a, sock_b) = tokio::io::duplex(64 * 1024);
    let cancel = CancelToken::new();
    let session_a = SyncSession::new(store_a, config.clone());
    let session_b = SyncSession::new(store_b, config);

    let (report_a, report_b) = tokio::join!(
        session_a.run(sock_a, &cancel),
        session_b.run(sock_b, &cancel),
    );
    (report_a.expect("side a"), report_b.expect("side b"))
}

async fn run_pair(store_a: &MemoryStore, store_b: &MemoryStore) -> (SyncReport, SyncReport) {
    run_pair_with(store_a, store_b, SessionConfig::default()).await
}

async fn assert_same_notes(a: &MemoryStore, b: &MemoryStore) {
    let notes_a = a.all_notes().await.unwrap();
    let notes_b = b.all_notes().await.unwrap();
    assert_eq!(notes_a, notes_b, "stores diverged after sync");
}

#[tokio::test]
async fn test_empty_stores_exchange_nothing() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();

    let (report_a, report_b) = run_pair(&a, &b).await;
    assert_eq!(report_a.advertised, 0);
    assert_eq!(report_a.requested, 0);
    assert_eq!(report_a.notes_received, 0);
    assert_eq!(report_b.advertised, 0);
    assert_eq!(report_b.notes_received, 0);
    assert!(report_a.peer_deleted.is_empty());
}

#[tokio::test]
async fn test_disjoint_stores_converge_to_the_union() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    a.upsert_note(Note::new("one", "first", ts(1), ts(1))).await.unwrap();
    a.upsert_note(Note::new("two", "second", ts(2), ts(2))).await.unwrap();
    b.upsert_note(Note::new("three", "third", ts(3), ts(3))).await.unwrap();

    let (report_a, report_b) = run_pair(&a, &b).await;

    assert_eq!(report_a.advertised, 2);
    assert_eq!(report_a.peer_advertised, 1);
    assert_eq!(report_a.notes_received, 1);
    assert_eq!(report_b.notes_received, 2);
    assert_eq!(report_a.peer_requested, report_b.requested);

    assert_same_notes(&a, &b).await;
    assert_eq!(a.all_notes().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_newer_edit_replaces_older_copy() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    a.upsert_note(Note::new("draft", "rewritten", ts(1), ts(9))).await.unwrap();
    b.upsert_note(Note::new("draft", "original", ts(1), ts(5))).await.unwrap();

    let (report_a, report_b) = run_pair(&a, &b).await;

    // Only the stale side requests anything.
    assert_eq!(report_a.requested, 0);
    assert_eq!(report_b.requested, 1);
    assert_eq!(report_b.notes_received, 1);

    assert_same_notes(&a, &b).await;
    let merged = b.note(ts(1)).await.unwrap().unwrap();
    assert_eq!(merged.content, "rewritten");
    assert_eq!(merged.edited, ts(9));
}

#[tokio::test]
async fn test_deleted_notes_are_not_resurrected() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    let shared = Note::new("shopping", "bread", ts(1), ts(1));
    a.upsert_note(shared.clone()).await.unwrap();
    b.upsert_note(shared).await.unwrap();

    assert!(a.delete_note(ts(1)).await.unwrap());

    let (report_a, _report_b) = run_pair(&a, &b).await;

    // The peer still advertises the note, but the tombstone wins.
    assert_eq!(report_a.peer_advertised, 1);
    assert_eq!(report_a.requested, 0);
    assert!(a.note(ts(1)).await.unwrap().is_none());
    assert!(b.note(ts(1)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_associations_flow_both_ways() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    a.upsert_note(Note::new("parent", "", ts(1), ts(1))).await.unwrap();
    a.upsert_note(Note::new("child", "", ts(2), ts(2))).await.unwrap();
    a.insert_association(Association::new(ts(1), ts(2))).await.unwrap();
    b.upsert_note(Note::new("other parent", "", ts(3), ts(3))).await.unwrap();
    b.upsert_note(Note::new("other child", "", ts(4), ts(4))).await.unwrap();
    b.insert_association(Association::new(ts(3), ts(4))).await.unwrap();

    let (report_a, report_b) = run_pair(&a, &b).await;

    assert_eq!(report_a.associations_sent, 1);
    assert_eq!(report_a.associations_received, 1);
    assert_eq!(report_b.associations_received, 1);
    assert_eq!(a.all_associations().await.unwrap().len(), 2);
    assert_eq!(b.all_associations().await.unwrap().len(), 2);

    // A second pass finds nothing new.
    let (again_a, again_b) = run_pair(&a, &b).await;
    assert_eq!(again_a.associations_received, 0);
    assert_eq!(again_b.associations_received, 0);
}

#[tokio::test]
async fn test_second_sync_is_idempotent() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    a.upsert_note(Note::new("only", "copy", ts(1), ts(1))).await.unwrap();

    run_pair(&a, &b).await;
    let (report_a, report_b) = run_pair(&a, &b).await;

    assert_eq!(report_a.requested, 0);
    assert_eq!(report_b.requested, 0);
    assert_eq!(report_a.notes_received, 0);
    assert_eq!(report_b.notes_received, 0);
    assert_same_notes(&a, &b).await;
}

#[tokio::test]
async fn test_large_store_crosses_many_flushes() {
    let a = MemoryStore::new();
    let b = MemoryStore::new();
    for i in 0..600u32 {
        let stamp = Timestamp::new(2024, 5, 20, 12, (i / 60) % 60, i % 60, i % 1000).unwrap();
        let note = Note::new(
            format!("note {i}"),
            "x".repeat((i % 40) as usize + 1),
            stamp,
            stamp,
        );
        a.upsert_note(note).await.unwrap();
    }
    // One long note forces the full-note framing across several flushes.
    a.upsert_note(Note::new(
        "long",
        "y".repeat(10_000),
        ts(999),
        ts(999),
    ))
    .await
    .unwrap();

    let (report_a, report_b) = run_pair(&a, &b).await;

    assert_eq!(report_a.advertised, 601);
    assert_eq!(report_b.notes_received, 601);
    assert_same_notes(&a, &b).await;
}

#[tokio::test]
async fn test_cancel_aborts_a_stalled_session() {
    let store = MemoryStore::new();
    store.upsert_note(Note::new("stuck", "", ts(1), ts(1))).await.unwrap();

    let (sock_a, _sock_b) = tokio::io::duplex(64 * 1024);
    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.stop();
    });

    let session = SyncSession::new(&store, SessionConfig::default());
    let err = session.run(sock_a, &cancel).await.unwrap_err();
    assert!(matches!(err, SyncError::Cancelled));
}

#[tokio::test]
async fn test_silent_peer_times_out() {
    let store = MemoryStore::new();
    let (sock_a, _sock_b) = tokio::io::duplex(64 * 1024);
    let cancel = CancelToken::new();

    let config = SessionConfig {
        io_timeout: Duration::from_millis(50),
        ..SessionConfig::default()
    };
    let session = SyncSession::new(&store, config);
    let err = session.run(sock_a, &cancel).await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout(_)));
}
