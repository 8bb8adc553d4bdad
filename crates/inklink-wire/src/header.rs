//! Wire header bytes.
//!
//! Every transmission starts with a single header byte that says what
//! follows. All multi-byte integers in payloads are big-endian; timestamps
//! are the fixed 28-byte encoding from `inklink-core`.
//!
//! | Byte | Header | Payload |
//! |------|--------|---------|
//! | 0x00 | `End` | none |
//! | 0x01 | `EndAck` | none |
//! | 0x02 | `StampsData` | count:1, then count × 56-byte stamp pair |
//! | 0x03 | `StampsCount` | total:4 |
//! | 0x04 | `StampsAck` | none |
//! | 0x05 | `NeededData` | count:1, then count × 28-byte timestamp |
//! | 0x06 | `NeededCount` | total:4 |
//! | 0x07 | `NeededAck` | none |
//! | 0x08 | `NoteBegin` | title_len:4, content_len:4 |
//! | 0x09 | `NotesCount` | total:4 |
//! | 0x0A | `NotesAck` | none |
//! | 0x0B | `NotesBufferEnd` | none |
//! | 0x0C | `NoteTitle` | len:4, len bytes |
//! | 0x0D | `NoteContent` | len:4, len bytes |
//! | 0x0E | `NoteCreated` | 28-byte timestamp |
//! | 0x0F | `NoteEdited` | 28-byte timestamp |
//! | 0x10 | `AssociationsData` | count:1, then count × 56-byte pair |
//! | 0x11 | `AssociationsCount` | total:4 |
//! | 0x12 | `AssociationsAck` | none |
//! | 0x13 | `DeletedData` | count:1, then count × 28-byte timestamp |
//! | 0x14 | `DeletedCount` | total:4 |
//! | 0x15 | `DeletedAck` | none |

/// One byte on the wire that says what follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Header {
    /// No more data from this side.
    End = 0x00,
    /// The peer's end marker was seen.
    EndAck = 0x01,
    /// Sub-chunk of (creation, last-edit) stamp pairs.
    StampsData = 0x02,
    /// Total number of stamp pairs that will follow.
    StampsCount = 0x03,
    StampsAck = 0x04,
    /// Sub-chunk of creation timestamps this side wants in full.
    NeededData = 0x05,
    NeededCount = 0x06,
    NeededAck = 0x07,
    /// Start of one full note; carries both string byte lengths.
    NoteBegin = 0x08,
    NotesCount = 0x09,
    NotesAck = 0x0a,
    /// End of one physical flush of the notes stream.
    NotesBufferEnd = 0x0b,
    /// One chunk of title bytes.
    NoteTitle = 0x0c,
    /// One chunk of content bytes.
    NoteContent = 0x0d,
    NoteCreated = 0x0e,
    /// Last-edit timestamp; completes the note.
    NoteEdited = 0x0f,
    /// Sub-chunk of parent/child pairs.
    AssociationsData = 0x10,
    AssociationsCount = 0x11,
    AssociationsAck = 0x12,
    /// Sub-chunk of deleted creation timestamps.
    DeletedData = 0x13,
    DeletedCount = 0x14,
    DeletedAck = 0x15,
}

impl Header {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(Header::End),
            0x01 => Some(Header::EndAck),
            0x02 => Some(Header::StampsData),
            0x03 => Some(Header::StampsCount),
            0x04 => Some(Header::StampsAck),
            0x05 => Some(Header::NeededData),
            0x06 => Some(Header::NeededCount),
            0x07 => Some(Header::NeededAck),
            0x08 => Some(Header::NoteBegin),
            0x09 => Some(Header::NotesCount),
            0x0a => Some(Header::NotesAck),
            0x0b => Some(Header::NotesBufferEnd),
            0x0c => Some(Header::NoteTitle),
            0x0d => Some(Header::NoteContent),
            0x0e => Some(Header::NoteCreated),
            0x0f => Some(Header::NoteEdited),
            0x10 => Some(Header::AssociationsData),
            0x11 => Some(Header::AssociationsCount),
            0x12 => Some(Header::AssociationsAck),
            0x13 => Some(Header::DeletedData),
            0x14 => Some(Header::DeletedCount),
            0x15 => Some(Header::DeletedAck),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The header triple of one counted record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeaders {
    /// Announces one sub-chunk of records.
    pub data: Header,
    /// Announces the total element count, once per stream.
    pub count: Header,
    /// Acknowledges one consumed sub-chunk.
    pub ack: Header,
}

impl StreamHeaders {
    pub const STAMPS: Self = Self {
        data: Header::StampsData,
        count: Header::StampsCount,
        ack: Header::StampsAck,
    };

    pub const NEEDED: Self = Self {
        data: Header::NeededData,
        count: Header::NeededCount,
        ack: Header::NeededAck,
    };

    pub const ASSOCIATIONS: Self = Self {
        data: Header::AssociationsData,
        count: Header::AssociationsCount,
        ack: Header::AssociationsAck,
    };

    pub const DELETED: Self = Self {
        data: Header::DeletedData,
        count: Header::DeletedCount,
        ack: Header::DeletedAck,
    };
}
