//! # InkLink Sync
//!
//! Connection negotiation and the note exchange session.
//!
//! ## Overview
//!
//! Syncing two devices takes two phases. Negotiation turns a mutual
//! willingness to talk into exactly one socket, even when both devices dial
//! each other at once. The session then runs the full-duplex exchange over
//! that socket: both sides advertise their note stamps, request what they
//! are missing, answer with full notes, and share parent/child
//! associations. Notes a device deleted stay deleted; a peer's older copy
//! never resurrects them.
//!
//! ## Key Types
//!
//! - [`Connector`]: how to reach one peer (TCP, in-memory, ...)
//! - [`Negotiator`]: collapses the dial/accept race to one socket
//! - [`SyncSession`]: the exchange itself, bound to a local store
//! - [`SyncReport`]: what a completed session moved in each direction
//! - [`CancelToken`]: cooperative stop signal for both phases

pub mod cancel;
pub mod connector;
pub mod error;
pub mod negotiate;
pub mod reconcile;
pub mod session;
pub mod tcp;

pub use cancel::CancelToken;
pub use connector::{memory::MemoryConnector, Connector};
pub use error::{Result, SyncError};
pub use negotiate::{NegotiateConfig, NegotiateError, Negotiator};
pub use reconcile::needed_stamps;
pub use session::{SessionConfig, SyncReport, SyncSession};
pub use tcp::TcpConnector;
