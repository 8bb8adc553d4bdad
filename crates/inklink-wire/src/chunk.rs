//! Counted record streams with per-stream acknowledgement flow control.
//!
//! A stream opens with its count header and 4-byte total, then moves records
//! in sub-chunks of at most 255, each prefixed by the data header and a
//! one-byte count. The sender parks after every flush until the inbound
//! dispatch loop observes the peer's ack header and grants the stream's
//! [`AckGate`], so at most one sub-chunk per stream is ever in flight.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{oneshot, Semaphore};

use crate::channel::{ChannelWriter, FramedReader};
use crate::error::{Result, WireError};
use crate::header::StreamHeaders;
use crate::limits;
use crate::record::WireRecord;
use crate::window::SendWindow;

/// Largest sub-chunk expressible with a one-byte element count.
pub const MAX_SUBCHUNK: usize = u8::MAX as usize;

/// Rendezvous between the inbound dispatch loop and one outbound stream.
///
/// Starts with zero permits. The dispatch loop grants one permit per ack
/// header it sees; the sender takes one permit per flushed sub-chunk.
pub struct AckGate {
    permits: Semaphore,
}

impl AckGate {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
        }
    }

    /// Record one acknowledgement. Never blocks.
    pub fn grant(&self) {
        self.permits.add_permits(1);
    }

    /// Wait for the next acknowledgement.
    pub async fn acknowledged(&self) -> Result<()> {
        match self.permits.acquire().await {
            Ok(permit) => {
                permit.forget();
                Ok(())
            }
            Err(_) => Err(WireError::Closed),
        }
    }

    /// Unblock any waiting sender with [`WireError::Closed`].
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for AckGate {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendState {
    CountNotSent,
    Sending,
    Done,
}

/// Sends one counted stream of fixed-size records.
pub struct ChunkSender<'a, T, W> {
    writer: ChannelWriter<W>,
    headers: StreamHeaders,
    records: &'a [T],
    gate: &'a AckGate,
    window: SendWindow,
    sent: usize,
    state: SendState,
}

impl<'a, T: WireRecord, W: AsyncWrite + Unpin> ChunkSender<'a, T, W> {
    pub fn new(
        writer: ChannelWriter<W>,
        headers: StreamHeaders,
        records: &'a [T],
        gate: &'a AckGate,
        window_len: usize,
    ) -> Self {
        Self {
            writer,
            headers,
            records,
            gate,
            window: SendWindow::new(window_len),
            sent: 0,
            state: SendState::CountNotSent,
        }
    }

    /// Whether the count and every record have been flushed and acknowledged.
    pub fn all_sent(&self) -> bool {
        self.state == SendState::Done
    }

    /// Drive the stream to completion.
    ///
    /// The count header and total share the first flush with the first
    /// sub-chunk. A zero-count stream flushes the count alone and awaits no
    /// acknowledgement.
    pub async fn run(&mut self) -> Result<()> {
        let total = u32::try_from(self.records.len())
            .map_err(|_| WireError::protocol("stream larger than a 4-byte count"))?;
        tracing::debug!(stream = ?self.headers.data, records = total, "sending counted stream");

        self.window.push_u8(self.headers.count.as_u8());
        self.window.push_u32(total);
        self.state = SendState::Sending;

        if self.records.is_empty() {
            let frame = self.window.take();
            self.writer.send(&frame).await?;
            self.state = SendState::Done;
            return Ok(());
        }

        while self.sent < self.records.len() {
            let space = self.window.remaining().saturating_sub(2);
            let fit = (space / T::SIZE)
                .min(MAX_SUBCHUNK)
                .min(self.records.len() - self.sent);
            if fit == 0 {
                return Err(WireError::protocol("send window too small for one record"));
            }

            self.window.push_u8(self.headers.data.as_u8());
            let count_pos = self.window.reserve_u8();
            for record in &self.records[self.sent..self.sent + fit] {
                record.encode(&mut self.window);
            }
            self.window.set_u8(count_pos, fit as u8);
            self.sent += fit;

            let frame = self.window.take();
            self.writer.send(&frame).await?;
            self.gate.acknowledged().await?;
        }

        self.state = SendState::Done;
        Ok(())
    }
}

/// Receives one counted stream of fixed-size records.
///
/// Driven by the dispatch loop: [`ChunkReceiver::on_count`] when the count
/// header arrives, [`ChunkReceiver::on_chunk`] per data sub-chunk. When the
/// running total reaches the advertised count the full ordered list is
/// delivered through the one-shot handle returned by [`ChunkReceiver::new`].
pub struct ChunkReceiver<T> {
    headers: StreamHeaders,
    expected: Option<u32>,
    received: Vec<T>,
    done: Option<oneshot::Sender<Vec<T>>>,
}

impl<T: WireRecord> ChunkReceiver<T> {
    pub fn new(headers: StreamHeaders) -> (Self, oneshot::Receiver<Vec<T>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                headers,
                expected: None,
                received: Vec::new(),
                done: Some(tx),
            },
            rx,
        )
    }

    /// Whether the count header has been seen.
    pub fn started(&self) -> bool {
        self.expected.is_some()
    }

    /// Whether every advertised record has arrived and been delivered.
    pub fn is_complete(&self) -> bool {
        self.started() && self.done.is_none()
    }

    /// Consume the 4-byte total following this stream's count header.
    pub async fn on_count<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        if self.expected.is_some() {
            return Err(WireError::protocol("duplicate count header"));
        }
        let total = reader.read_u32().await?;
        if total > limits::MAX_STREAM_COUNT {
            return Err(WireError::protocol(format!(
                "advertised count {total} exceeds limit"
            )));
        }
        self.expected = Some(total);
        self.received.reserve(total.min(4096) as usize);
        self.deliver_if_complete();
        Ok(())
    }

    /// Consume one data sub-chunk, then acknowledge it to the peer.
    pub async fn on_chunk<R, W>(
        &mut self,
        reader: &mut FramedReader<R>,
        writer: &ChannelWriter<W>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(expected) = self.expected else {
            return Err(WireError::protocol("data sub-chunk before count"));
        };
        let count = reader.read_u8().await? as usize;
        if count == 0 {
            return Err(WireError::protocol("empty sub-chunk"));
        }
        if self.received.len() + count > expected as usize {
            return Err(WireError::protocol("more records than advertised"));
        }

        let mut scratch = vec![0u8; T::SIZE];
        for _ in 0..count {
            reader.read_exact(&mut scratch).await?;
            self.received.push(T::decode(&scratch)?);
        }

        self.deliver_if_complete();
        writer.send_header(self.headers.ack).await?;
        Ok(())
    }

    fn deliver_if_complete(&mut self) {
        if self.expected == Some(self.received.len() as u32) {
            if let Some(tx) = self.done.take() {
                let _ = tx.send(std::mem::take(&mut self.received));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;
    use inklink_core::{NoteStamp, Timestamp};
    use tokio::io::split;

    fn nth_stamp(i: usize) -> Timestamp {
        let i = i as u32;
        Timestamp::new(2024, 1, 1, 0, (i / 60_000) % 60, (i / 1000) % 60, i % 1000).unwrap()
    }

    async fn roundtrip(n: usize) {
        let records: Vec<NoteStamp> = (0..n)
            .map(|i| NoteStamp::new(nth_stamp(i), nth_stamp(i + 1)))
            .collect();

        let (a, b) = tokio::io::duplex(512);
        let (a_read, a_write) = split(a);
        let (b_read, b_write) = split(b);

        let writer_a = ChannelWriter::new(a_write);
        let writer_b = ChannelWriter::new(b_write);
        let gate = AckGate::new();
        let (mut receiver, delivered) = ChunkReceiver::<NoteStamp>::new(StreamHeaders::STAMPS);

        let send = async {
            let mut sender =
                ChunkSender::new(writer_a.clone(), StreamHeaders::STAMPS, &records, &gate, 256);
            sender.run().await?;
            assert!(sender.all_sent());
            Ok::<_, WireError>(())
        };

        let receive = async {
            let mut reader = FramedReader::new(b_read, 256);
            while !receiver.is_complete() {
                match reader.read_header().await? {
                    Header::StampsCount => receiver.on_count(&mut reader).await?,
                    Header::StampsData => receiver.on_chunk(&mut reader, &writer_b).await?,
                    other => return Err(WireError::protocol(format!("unexpected {other:?}"))),
                }
            }
            Ok::<_, WireError>(())
        };

        let ack_pump = async {
            let mut reader = FramedReader::new(a_read, 64);
            loop {
                match reader.read_header().await? {
                    Header::StampsAck => gate.grant(),
                    other => {
                        return Err::<(), _>(WireError::protocol(format!("unexpected {other:?}")))
                    }
                }
            }
        };

        let drive = async { tokio::try_join!(send, receive) };
        tokio::select! {
            res = drive => { res.unwrap(); }
            res = ack_pump => panic!("ack pump ended early: {res:?}"),
        }

        let got = delivered.await.unwrap();
        assert_eq!(got, records);
    }

    #[tokio::test]
    async fn test_roundtrip_counts() {
        for n in [0usize, 1, 255, 256, 1000] {
            roundtrip(n).await;
        }
    }

    #[tokio::test]
    async fn test_zero_count_stream_flushes_count_alone() {
        let (a, b) = tokio::io::duplex(128);
        let (_a_read, a_write) = split(a);
        let (b_read, _b_write) = split(b);

        let writer = ChannelWriter::new(a_write);
        let gate = AckGate::new();
        let records: Vec<Timestamp> = Vec::new();
        let mut sender = ChunkSender::new(writer, StreamHeaders::NEEDED, &records, &gate, 64);
        sender.run().await.unwrap();
        assert!(sender.all_sent());

        let mut reader = FramedReader::new(b_read, 64);
        assert_eq!(reader.read_header().await.unwrap(), Header::NeededCount);
        assert_eq!(reader.read_u32().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_gate_unblocks_sender() {
        let (a, _b) = tokio::io::duplex(1024);
        let (_a_read, a_write) = split(a);

        let writer = ChannelWriter::new(a_write);
        let gate = AckGate::new();
        let records: Vec<Timestamp> = (0..10).map(nth_stamp).collect();
        let mut sender = ChunkSender::new(writer, StreamHeaders::NEEDED, &records, &gate, 64);

        let run = async {
            let err = sender.run().await.unwrap_err();
            assert!(matches!(err, WireError::Closed));
        };
        let close = async {
            tokio::task::yield_now().await;
            gate.close();
        };
        tokio::join!(run, close);
    }

    #[tokio::test]
    async fn test_gate_grant_then_acknowledge() {
        let gate = AckGate::new();
        gate.grant();
        gate.acknowledged().await.unwrap();

        gate.close();
        assert!(matches!(
            gate.acknowledged().await.unwrap_err(),
            WireError::Closed
        ));
    }

    #[tokio::test]
    async fn test_chunk_before_count_is_protocol_error() {
        let (a, b) = tokio::io::duplex(128);
        let (_a_read, a_write) = split(a);
        let (b_read, b_write) = split(b);

        let writer_a = ChannelWriter::new(a_write);
        let writer_b = ChannelWriter::new(b_write);

        writer_a.send_header(Header::StampsData).await.unwrap();

        let mut reader = FramedReader::new(b_read, 64);
        let (mut receiver, _delivered) = ChunkReceiver::<NoteStamp>::new(StreamHeaders::STAMPS);
        assert_eq!(reader.read_header().await.unwrap(), Header::StampsData);
        let err = receiver
            .on_chunk(&mut reader, &writer_b)
            .await
            .unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
    }
}
