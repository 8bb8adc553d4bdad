//! The sync session: full-duplex exchange over one negotiated socket.
//!
//! Each side runs two halves concurrently. The outbound half walks the
//! protocol steps in order: advertise stamp pairs, request what is missing
//! or newer, answer the peer's request with full notes, send associations,
//! then the end marker. The inbound half dispatches every arriving frame to
//! the matching stream receiver and feeds acks back to the outbound half's
//! gates. Outbound steps that depend on peer data wait on one-shot handles
//! the inbound half fulfills, so neither half ever blocks the socket.
//!
//! Received notes and associations are committed to the store only after
//! both halves finish cleanly.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tokio::time::timeout;

use inklink_core::{Association, Note, NoteStamp, Timestamp, Tombstone};
use inklink_store::{NoteStore, NoteStoreExt, StoreSnapshot};
use inklink_wire::{
    AckGate, ChannelWriter, ChunkReceiver, ChunkSender, FramedReader, Header, NoteReceiver,
    NoteSender, StreamHeaders, MIN_WINDOW_LEN,
};

use crate::cancel::CancelToken;
use crate::error::{Result, SyncError};
use crate::reconcile::needed_stamps;

/// Tuning for a sync session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bytes per flush in each direction.
    pub window_len: usize,
    /// How long the peer may go silent before the session fails.
    pub io_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_len: 1024,
            io_timeout: Duration::from_secs(30),
        }
    }
}

/// What a completed session exchanged.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Stamp pairs advertised to the peer.
    pub advertised: usize,
    /// Stamp pairs the peer advertised.
    pub peer_advertised: usize,
    /// Notes requested from the peer.
    pub requested: usize,
    /// Notes the peer requested and was sent in full.
    pub peer_requested: usize,
    /// Full notes received and committed.
    pub notes_received: usize,
    /// Associations sent to the peer.
    pub associations_sent: usize,
    /// Associations committed locally as new.
    pub associations_received: usize,
    /// Creation timestamps the peer reports as deleted on its side.
    pub peer_deleted: Vec<Timestamp>,
}

/// One ack gate per outbound stream.
#[derive(Default)]
struct StreamGates {
    stamps: AckGate,
    needed: AckGate,
    notes: AckGate,
    associations: AckGate,
    deleted: AckGate,
}

/// A sync session bound to a local store.
pub struct SyncSession<'a, S> {
    store: &'a S,
    config: SessionConfig,
}

impl<'a, S: NoteStore> SyncSession<'a, S> {
    pub fn new(store: &'a S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Run the full exchange over `socket`.
    pub async fn run<IO>(&self, socket: IO, cancel: &CancelToken) -> Result<SyncReport>
    where
        IO: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let window_len = self.config.window_len.max(MIN_WINDOW_LEN);
        if window_len != self.config.window_len {
            tracing::debug!(window_len, "configured window too small, clamped");
        }

        let snapshot = self.store.snapshot().await?;
        let (read_half, write_half) = tokio::io::split(socket);
        let reader = FramedReader::new(read_half, window_len);
        let writer = ChannelWriter::new(write_half);
        let gates = StreamGates::default();

        let (stamps_state, stamps_rx) = ChunkReceiver::<NoteStamp>::new(StreamHeaders::STAMPS);
        let (needed_state, needed_rx) = ChunkReceiver::<Timestamp>::new(StreamHeaders::NEEDED);
        let (notes_state, mut notes_rx) = NoteReceiver::new();
        let (associations_state, mut associations_rx) =
            ChunkReceiver::<Association>::new(StreamHeaders::ASSOCIATIONS);
        let (deleted_state, mut deleted_rx) = ChunkReceiver::<Tombstone>::new(StreamHeaders::DELETED);

        let inbound = Inbound {
            reader,
            writer: writer.clone(),
            gates: &gates,
            stamps: stamps_state,
            needed: needed_state,
            notes: notes_state,
            associations: associations_state,
            deleted: deleted_state,
            io_timeout: self.config.io_timeout,
            peer_ended: false,
            end_acked: false,
        };
        let exchange = async {
            tokio::try_join!(
                outbound(&snapshot, writer, &gates, stamps_rx, needed_rx, window_len),
                inbound.run(),
            )
        };

        let (summary, ()) = tokio::select! {
            res = exchange => res?,
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
        };

        let notes = notes_rx.try_recv().unwrap_or_default();
        let associations = associations_rx.try_recv().unwrap_or_default();
        let deleted = deleted_rx.try_recv().unwrap_or_default();

        if notes.len() != summary.requested {
            return Err(SyncError::Protocol(format!(
                "peer sent {} notes, {} were requested",
                notes.len(),
                summary.requested
            )));
        }

        let notes_received = notes.len();
        for note in notes {
            self.store.upsert_note(note).await?;
        }
        let mut associations_received = 0;
        for association in &associations {
            if self.store.insert_association(*association).await? {
                associations_received += 1;
            }
        }

        let report = SyncReport {
            advertised: summary.advertised,
            peer_advertised: summary.peer_advertised,
            requested: summary.requested,
            peer_requested: summary.peer_requested,
            notes_received,
            associations_sent: snapshot.associations.len(),
            associations_received,
            peer_deleted: deleted.into_iter().map(|t| t.created).collect(),
        };
        tracing::info!(
            advertised = report.advertised,
            peer_advertised = report.peer_advertised,
            notes_received = report.notes_received,
            peer_requested = report.peer_requested,
            "sync session complete"
        );
        Ok(report)
    }
}

struct OutboundSummary {
    advertised: usize,
    peer_advertised: usize,
    requested: usize,
    peer_requested: usize,
}

/// The sending half of a session.
async fn outbound<W>(
    snapshot: &StoreSnapshot,
    writer: ChannelWriter<W>,
    gates: &StreamGates,
    stamps_rx: oneshot::Receiver<Vec<NoteStamp>>,
    needed_rx: oneshot::Receiver<Vec<Timestamp>>,
    window_len: usize,
) -> Result<OutboundSummary>
where
    W: AsyncWrite + Unpin,
{
    let stamps: Vec<NoteStamp> = snapshot.notes.iter().map(Note::stamp).collect();
    ChunkSender::new(
        writer.clone(),
        StreamHeaders::STAMPS,
        &stamps,
        &gates.stamps,
        window_len,
    )
    .run()
    .await?;

    let peer_stamps = stamps_rx.await.map_err(|_| SyncError::Cancelled)?;
    let needed = needed_stamps(snapshot, &peer_stamps);
    ChunkSender::new(
        writer.clone(),
        StreamHeaders::NEEDED,
        &needed,
        &gates.needed,
        window_len,
    )
    .run()
    .await?;

    let peer_needed = needed_rx.await.map_err(|_| SyncError::Cancelled)?;
    let by_created: HashMap<Timestamp, &Note> = snapshot
        .notes
        .iter()
        .map(|note| (note.created, note))
        .collect();
    let mut full = Vec::with_capacity(peer_needed.len());
    for created in &peer_needed {
        match by_created.get(created) {
            Some(note) => full.push(*note),
            None => {
                return Err(SyncError::Protocol(format!(
                    "peer requested unknown note {created}"
                )))
            }
        }
    }
    NoteSender::new(writer.clone(), &gates.notes, window_len)
        .run(&full)
        .await?;

    ChunkSender::new(
        writer.clone(),
        StreamHeaders::ASSOCIATIONS,
        &snapshot.associations,
        &gates.associations,
        window_len,
    )
    .run()
    .await?;

    writer.send_header(Header::End).await?;

    Ok(OutboundSummary {
        advertised: stamps.len(),
        peer_advertised: peer_stamps.len(),
        requested: needed.len(),
        peer_requested: peer_needed.len(),
    })
}

/// The receiving half: one dispatch loop over every inbound frame.
struct Inbound<'a, R, W> {
    reader: FramedReader<R>,
    writer: ChannelWriter<W>,
    gates: &'a StreamGates,
    stamps: ChunkReceiver<NoteStamp>,
    needed: ChunkReceiver<Timestamp>,
    notes: NoteReceiver,
    associations: ChunkReceiver<Association>,
    deleted: ChunkReceiver<Tombstone>,
    io_timeout: Duration,
    peer_ended: bool,
    end_acked: bool,
}

impl<R, W> Inbound<'_, R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn run(mut self) -> Result<()> {
        while !(self.peer_ended && self.end_acked) {
            match timeout(self.io_timeout, self.dispatch_one()).await {
                Ok(res) => res?,
                Err(_) => return Err(SyncError::Timeout("waiting for the next frame".into())),
            }
        }
        self.check_streams_closed()
    }

    async fn dispatch_one(&mut self) -> Result<()> {
        let header = self.reader.read_header().await?;
        tracing::trace!(?header, "inbound frame");
        match header {
            Header::StampsCount => self.stamps.on_count(&mut self.reader).await?,
            Header::StampsData => self.stamps.on_chunk(&mut self.reader, &self.writer).await?,
            Header::StampsAck => self.gates.stamps.grant(),

            Header::NeededCount => self.needed.on_count(&mut self.reader).await?,
            Header::NeededData => self.needed.on_chunk(&mut self.reader, &self.writer).await?,
            Header::NeededAck => self.gates.needed.grant(),

            Header::NotesCount => self.notes.on_count(&mut self.reader).await?,
            Header::NoteBegin => self.notes.on_begin(&mut self.reader).await?,
            Header::NoteTitle => self.notes.on_title(&mut self.reader).await?,
            Header::NoteContent => self.notes.on_content(&mut self.reader).await?,
            Header::NoteCreated => self.notes.on_created(&mut self.reader).await?,
            Header::NoteEdited => self.notes.on_edited(&mut self.reader).await?,
            Header::NotesBufferEnd => self.notes.on_buffer_end(&self.writer).await?,
            Header::NotesAck => self.gates.notes.grant(),

            Header::AssociationsCount => self.associations.on_count(&mut self.reader).await?,
            Header::AssociationsData => {
                self.associations
                    .on_chunk(&mut self.reader, &self.writer)
                    .await?
            }
            Header::AssociationsAck => self.gates.associations.grant(),

            Header::DeletedCount => self.deleted.on_count(&mut self.reader).await?,
            Header::DeletedData => self.deleted.on_chunk(&mut self.reader, &self.writer).await?,
            Header::DeletedAck => self.gates.deleted.grant(),

            Header::End => {
                self.writer.send_header(Header::EndAck).await?;
                self.peer_ended = true;
            }
            Header::EndAck => self.end_acked = true,
        }
        Ok(())
    }

    /// The peer said it is done; every stream it opened must have finished.
    fn check_streams_closed(&self) -> Result<()> {
        if !self.stamps.is_complete() || !self.needed.is_complete() || !self.notes.is_complete() {
            return Err(SyncError::Protocol(
                "peer ended before completing its mandatory streams".into(),
            ));
        }
        if self.associations.started() && !self.associations.is_complete() {
            return Err(SyncError::Protocol("association stream truncated".into()));
        }
        if self.deleted.started() && !self.deleted.is_complete() {
            return Err(SyncError::Protocol("deleted stream truncated".into()));
        }
        Ok(())
    }
}
