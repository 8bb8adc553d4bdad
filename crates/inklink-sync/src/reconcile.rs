//! Deciding which advertised notes to request.

use std::collections::{HashMap, HashSet};

use inklink_core::{NoteStamp, Timestamp};
use inklink_store::StoreSnapshot;

/// Creation timestamps of peer notes this device wants in full.
///
/// A note is wanted when it is absent locally, or when the peer's last-edit
/// stamp is strictly newer than ours. Notes this device has deleted are
/// never wanted back, whatever their edit stamp says.
pub fn needed_stamps(snapshot: &StoreSnapshot, peer: &[NoteStamp]) -> Vec<Timestamp> {
    let local: HashMap<Timestamp, Timestamp> = snapshot
        .notes
        .iter()
        .map(|note| (note.created, note.edited))
        .collect();
    let deleted: HashSet<Timestamp> = snapshot
        .tombstones
        .iter()
        .map(|tombstone| tombstone.created)
        .collect();

    peer.iter()
        .filter(|stamp| !deleted.contains(&stamp.created))
        .filter(|stamp| match local.get(&stamp.created) {
            None => true,
            Some(local_edited) => stamp.edited > *local_edited,
        })
        .map(|stamp| stamp.created)
        .collect()
}
