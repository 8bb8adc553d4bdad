//! # InkLink Core
//!
//! Data model for the InkLink note synchronizer: calendar timestamps, notes,
//! parent/child associations, and deletion tombstones.
//!
//! This crate contains no I/O and no networking. Everything here is plain
//! data with a total order and a fixed binary encoding for timestamps.
//!
//! ## Key Types
//!
//! - [`Timestamp`] - Millisecond-precision calendar instant; the primary identifier of a note
//! - [`Note`] - A full note record (title, content, creation and last-edit stamps)
//! - [`NoteStamp`] - The (creation, last-edit) pair advertised during reconciliation
//! - [`Association`] - Parent/child link between two notes
//! - [`Tombstone`] - Deletion marker that outlives its note
//! - [`DeviceId`] - Six-byte device identity used to break negotiation ties

pub mod device;
pub mod error;
pub mod note;
pub mod time;

pub use device::DeviceId;
pub use error::CoreError;
pub use note::{Association, Note, NoteStamp, Tombstone};
pub use time::Timestamp;
