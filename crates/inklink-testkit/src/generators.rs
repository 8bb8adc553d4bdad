//! Proptest generators for property-based testing.

use proptest::prelude::*;

use inklink_core::{Association, DeviceId, Note, NoteStamp, Timestamp, Tombstone};

/// Any valid calendar timestamp. Days stop at 28 so every month works.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (
        1970u32..=2100,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1000,
    )
        .prop_map(|(year, month, day, hour, minute, second, milli)| {
            Timestamp::new(year, month, day, hour, minute, second, milli)
                .expect("generated fields are in range")
        })
}

/// A stamp pair with the last edit at or after creation.
pub fn note_stamp() -> impl Strategy<Value = NoteStamp> {
    (timestamp(), timestamp()).prop_map(|(a, b)| {
        if a <= b {
            NoteStamp::new(a, b)
        } else {
            NoteStamp::new(b, a)
        }
    })
}

/// A full note with arbitrary unicode title and content.
pub fn note() -> impl Strategy<Value = Note> {
    (note_stamp(), ".{0,48}", ".{0,192}").prop_map(|(stamp, title, content)| {
        Note::new(title, content, stamp.created, stamp.edited)
    })
}

pub fn association() -> impl Strategy<Value = Association> {
    (timestamp(), timestamp()).prop_map(|(parent, child)| Association::new(parent, child))
}

pub fn tombstone() -> impl Strategy<Value = Tombstone> {
    timestamp().prop_map(Tombstone::new)
}

pub fn device_id() -> impl Strategy<Value = DeviceId> {
    any::<[u8; 6]>().prop_map(DeviceId::from_bytes)
}
