//! # Inklink Wire
//!
//! Binary wire protocol for note synchronization sessions.
//!
//! ## Overview
//!
//! Everything on the socket is a stream of single-byte headers followed by
//! big-endian payloads. Fixed-size records (date stamps, stamp pairs,
//! associations) travel in counted [`chunk`] streams; full notes travel in
//! the variable-length [`notes`] framing. Both flavors flush through a
//! bounded send window and wait for the peer's ack before the next flush,
//! so neither side ever buffers more than one window per stream.
//!
//! ## Flush Flow
//!
//! ```text
//! Sender                                Receiver
//!   |------ count header + total ------->|
//!   |------ data header + records ------>|
//!   |<----- stream ack ------------------|
//!   |------ data header + records ------>|
//!   |<----- stream ack ------------------|
//! ```
//!
//! ## Key Types
//!
//! - [`Header`]: every frame's one-byte discriminant
//! - [`FramedReader`] / [`ChannelWriter`]: buffered halves of a socket
//! - [`ChunkSender`] / [`ChunkReceiver`]: counted fixed-size record streams
//! - [`NoteSender`] / [`NoteReceiver`]: full-note framing
//! - [`AckGate`]: one-permit flow control between flushes

pub mod channel;
pub mod chunk;
pub mod error;
pub mod header;
pub mod notes;
pub mod record;
pub mod window;

/// Inbound size limits. Anything past these is a malformed or hostile peer.
pub mod limits {
    /// Max records or notes a single counted stream may advertise.
    pub const MAX_STREAM_COUNT: u32 = 1 << 20;
    /// Max bytes a single note title or content may declare.
    pub const MAX_TEXT_LEN: u32 = 16 << 20;
}

pub use channel::{ChannelWriter, FramedReader};
pub use chunk::{AckGate, ChunkReceiver, ChunkSender, MAX_SUBCHUNK};
pub use error::{Result, WireError};
pub use header::{Header, StreamHeaders};
pub use notes::{NoteReceiver, NoteSender};
pub use record::WireRecord;
pub use window::{RecvWindow, SendWindow, MIN_WINDOW_LEN};
