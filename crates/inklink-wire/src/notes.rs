//! The full-note stream: variable-length records framed across flushes.
//!
//! A note travels as a begin frame carrying both string byte lengths, any
//! number of title and content chunks, and the two date frames; the last-edit
//! date completes the note. Frames pack into the send window back to back,
//! and every physical flush ends with [`Header::NotesBufferEnd`], which the
//! receiver answers with the notes ack. One note may span several flushes,
//! and one flush may carry several small notes.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;

use inklink_core::{Note, Timestamp};

use crate::channel::{ChannelWriter, FramedReader};
use crate::chunk::AckGate;
use crate::error::{Result, WireError};
use crate::header::Header;
use crate::limits;
use crate::window::SendWindow;

/// Sends requested notes in full.
pub struct NoteSender<'a, W> {
    writer: ChannelWriter<W>,
    gate: &'a AckGate,
    window: SendWindow,
}

impl<'a, W: AsyncWrite + Unpin> NoteSender<'a, W> {
    pub fn new(writer: ChannelWriter<W>, gate: &'a AckGate, window_len: usize) -> Self {
        Self {
            writer,
            gate,
            window: SendWindow::new(window_len),
        }
    }

    /// Send every note, in order, then seal the final flush.
    pub async fn run(&mut self, notes: &[&Note]) -> Result<()> {
        let total = u32::try_from(notes.len())
            .map_err(|_| WireError::protocol("more notes than a 4-byte count"))?;
        tracing::debug!(notes = total, "sending full notes");

        self.window.push_u8(Header::NotesCount.as_u8());
        self.window.push_u32(total);

        if notes.is_empty() {
            let frame = self.window.take();
            self.writer.send(&frame).await?;
            return Ok(());
        }

        for note in notes {
            self.push_note(note).await?;
        }
        self.seal_and_flush().await
    }

    /// Window space usable for frames; one byte stays reserved so the
    /// buffer-end marker always fits.
    fn space(&self) -> usize {
        self.window.remaining().saturating_sub(1)
    }

    async fn seal_and_flush(&mut self) -> Result<()> {
        self.window.push_u8(Header::NotesBufferEnd.as_u8());
        let frame = self.window.take();
        self.writer.send(&frame).await?;
        self.gate.acknowledged().await
    }

    async fn push_note(&mut self, note: &Note) -> Result<()> {
        let title = note.title.as_bytes();
        let content = note.content.as_bytes();
        if title.len() > limits::MAX_TEXT_LEN as usize
            || content.len() > limits::MAX_TEXT_LEN as usize
        {
            return Err(WireError::protocol("note text exceeds limit"));
        }

        if self.space() < 9 {
            self.seal_and_flush().await?;
        }
        self.window.push_u8(Header::NoteBegin.as_u8());
        self.window.push_u32(title.len() as u32);
        self.window.push_u32(content.len() as u32);

        self.push_text(Header::NoteTitle, title).await?;
        self.push_text(Header::NoteContent, content).await?;

        for (header, stamp) in [
            (Header::NoteCreated, note.created),
            (Header::NoteEdited, note.edited),
        ] {
            if self.space() < 1 + Timestamp::ENCODED_LEN {
                self.seal_and_flush().await?;
            }
            self.window.push_u8(header.as_u8());
            self.window.push_slice(&stamp.to_bytes());
        }
        Ok(())
    }

    /// Emit `text` as one or more chunks, each sized to the window. Empty
    /// strings emit no chunk at all; the declared length already says so.
    async fn push_text(&mut self, header: Header, text: &[u8]) -> Result<()> {
        let mut off = 0;
        while off < text.len() {
            if self.space() < 6 {
                self.seal_and_flush().await?;
            }
            let len = (self.space() - 5).min(text.len() - off);
            self.window.push_u8(header.as_u8());
            self.window.push_u32(len as u32);
            self.window.push_slice(&text[off..off + len]);
            off += len;
        }
        Ok(())
    }
}

struct TextAssembly {
    declared: usize,
    bytes: Vec<u8>,
}

impl TextAssembly {
    fn new(declared: usize) -> Self {
        Self {
            declared,
            bytes: Vec::with_capacity(declared.min(64 * 1024)),
        }
    }

    fn complete(&self) -> bool {
        self.bytes.len() == self.declared
    }
}

struct PendingNote {
    title: TextAssembly,
    content: TextAssembly,
    created: Option<Timestamp>,
}

/// Assembles inbound notes frame by frame.
///
/// Driven by the dispatch loop, one handler per frame header. Assembly state
/// survives flush boundaries: a half-received note simply continues in the
/// next flush.
pub struct NoteReceiver {
    expected: Option<u32>,
    received: Vec<Note>,
    pending: Option<PendingNote>,
    done: Option<oneshot::Sender<Vec<Note>>>,
}

impl NoteReceiver {
    pub fn new() -> (Self, oneshot::Receiver<Vec<Note>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                expected: None,
                received: Vec::new(),
                pending: None,
                done: Some(tx),
            },
            rx,
        )
    }

    pub fn started(&self) -> bool {
        self.expected.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.started() && self.done.is_none()
    }

    pub async fn on_count<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        if self.expected.is_some() {
            return Err(WireError::protocol("duplicate notes count"));
        }
        let total = reader.read_u32().await?;
        if total > limits::MAX_STREAM_COUNT {
            return Err(WireError::protocol(format!(
                "advertised note count {total} exceeds limit"
            )));
        }
        self.expected = Some(total);
        self.deliver_if_complete();
        Ok(())
    }

    pub async fn on_begin<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        let Some(expected) = self.expected else {
            return Err(WireError::protocol("note before count"));
        };
        if self.pending.is_some() {
            return Err(WireError::protocol("note begins before the previous one ended"));
        }
        if self.received.len() as u32 >= expected {
            return Err(WireError::protocol("more notes than advertised"));
        }

        let title_len = reader.read_u32().await?;
        let content_len = reader.read_u32().await?;
        if title_len > limits::MAX_TEXT_LEN || content_len > limits::MAX_TEXT_LEN {
            return Err(WireError::protocol("declared note text exceeds limit"));
        }

        self.pending = Some(PendingNote {
            title: TextAssembly::new(title_len as usize),
            content: TextAssembly::new(content_len as usize),
            created: None,
        });
        Ok(())
    }

    pub async fn on_title<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        self.on_text(reader, true).await
    }

    pub async fn on_content<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        self.on_text(reader, false).await
    }

    async fn on_text<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
        title: bool,
    ) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(WireError::protocol("text chunk without a begun note"));
        };
        let assembly = if title {
            &mut pending.title
        } else {
            &mut pending.content
        };

        let len = reader.read_u32().await? as usize;
        if len == 0 {
            return Err(WireError::protocol("empty text chunk"));
        }
        let start = assembly.bytes.len();
        if start + len > assembly.declared {
            return Err(WireError::protocol("text chunk overflows declared length"));
        }
        assembly.bytes.resize(start + len, 0);
        reader.read_exact(&mut assembly.bytes[start..]).await?;
        Ok(())
    }

    pub async fn on_created<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(WireError::protocol("creation date without a begun note"));
        };
        if pending.created.is_some() {
            return Err(WireError::protocol("duplicate creation date"));
        }
        pending.created = Some(reader.read_timestamp().await?);
        Ok(())
    }

    /// The last-edit date completes the note.
    pub async fn on_edited<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut FramedReader<R>,
    ) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Err(WireError::protocol("edit date without a begun note"));
        };
        let edited = reader.read_timestamp().await?;

        if !pending.title.complete() || !pending.content.complete() {
            return Err(WireError::protocol("note ended before its text arrived"));
        }
        let Some(created) = pending.created else {
            return Err(WireError::protocol("note ended without a creation date"));
        };
        let title = String::from_utf8(pending.title.bytes)
            .map_err(|_| WireError::protocol("note title is not valid UTF-8"))?;
        let content = String::from_utf8(pending.content.bytes)
            .map_err(|_| WireError::protocol("note content is not valid UTF-8"))?;

        self.received.push(Note::new(title, content, created, edited));
        self.deliver_if_complete();
        Ok(())
    }

    /// Acknowledge one consumed flush.
    pub async fn on_buffer_end<W: AsyncWrite + Unpin>(
        &mut self,
        writer: &ChannelWriter<W>,
    ) -> Result<()> {
        if self.expected.is_none() {
            return Err(WireError::protocol("buffer end before count"));
        }
        writer.send_header(Header::NotesAck).await
    }

    fn deliver_if_complete(&mut self) {
        if self.expected == Some(self.received.len() as u32) {
            if let Some(tx) = self.done.take() {
                tracing::debug!(notes = self.received.len(), "note stream complete");
                let _ = tx.send(std::mem::take(&mut self.received));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::split;

    fn stamp(milli: u32) -> Timestamp {
        Timestamp::new(2024, 9, 9, 14, 10, 0, milli).unwrap()
    }

    async fn roundtrip(notes: Vec<Note>, window_len: usize) {
        let (a, b) = tokio::io::duplex(512);
        let (a_read, a_write) = split(a);
        let (b_read, b_write) = split(b);

        let writer_a = ChannelWriter::new(a_write);
        let writer_b = ChannelWriter::new(b_write);
        let gate = AckGate::new();
        let (mut receiver, delivered) = NoteReceiver::new();

        let refs: Vec<&Note> = notes.iter().collect();
        let send = async {
            let mut sender = NoteSender::new(writer_a.clone(), &gate, window_len);
            sender.run(&refs).await
        };

        let receive = async {
            let mut reader = FramedReader::new(b_read, window_len);
            while !receiver.is_complete() {
                match reader.read_header().await? {
                    Header::NotesCount => receiver.on_count(&mut reader).await?,
                    Header::NoteBegin => receiver.on_begin(&mut reader).await?,
                    Header::NoteTitle => receiver.on_title(&mut reader).await?,
                    Header::NoteContent => receiver.on_content(&mut reader).await?,
                    Header::NoteCreated => receiver.on_created(&mut reader).await?,
                    Header::NoteEdited => receiver.on_edited(&mut reader).await?,
                    Header::NotesBufferEnd => receiver.on_buffer_end(&writer_b).await?,
                    other => return Err(WireError::protocol(format!("unexpected {other:?}"))),
                }
            }
            // The last note completes before the buffer-end that carried it;
            // consume and ack that final marker so the sender unparks.
            if !notes.is_empty() {
                match reader.read_header().await? {
                    Header::NotesBufferEnd => receiver.on_buffer_end(&writer_b).await?,
                    other => {
                        return Err(WireError::protocol(format!(
                            "expected final buffer end, got {other:?}"
                        )))
                    }
                }
            }
            Ok::<_, WireError>(())
        };

        let ack_pump = async {
            let mut reader = FramedReader::new(a_read, 64);
            loop {
                match reader.read_header().await? {
                    Header::NotesAck => gate.grant(),
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

        assert_eq!(delivered.await.unwrap(), notes);
    }

    #[tokio::test]
    async fn test_roundtrip_simple_notes() {
        let notes = vec![
            Note::new("groceries", "milk and eggs", stamp(1), stamp(2)),
            Note::new("ideas", "sync engine", stamp(3), stamp(3)),
        ];
        roundtrip(notes, 256).await;
    }

    #[tokio::test]
    async fn test_roundtrip_empty_list() {
        roundtrip(Vec::new(), 256).await;
    }

    #[tokio::test]
    async fn test_roundtrip_text_spanning_many_flushes() {
        let notes = vec![
            Note::new("a".repeat(200), "b".repeat(500), stamp(1), stamp(2)),
            Note::new("", "", stamp(3), stamp(4)),
            Note::new("émoji ✏️ titles", "ünïcödé content across chunks".repeat(20), stamp(5), stamp(6)),
        ];
        // A 64-byte window forces every string to split.
        roundtrip(notes, 64).await;
    }

    #[tokio::test]
    async fn test_note_without_creation_date_is_rejected() {
        let (a, b) = tokio::io::duplex(256);
        let (_a_read, a_write) = split(a);
        let (b_read, _b_write) = split(b);

        let writer = ChannelWriter::new(a_write);
        let mut frame = SendWindow::new(64);
        frame.push_u8(Header::NotesCount.as_u8());
        frame.push_u32(1);
        frame.push_u8(Header::NoteBegin.as_u8());
        frame.push_u32(0);
        frame.push_u32(0);
        frame.push_u8(Header::NoteEdited.as_u8());
        frame.push_slice(&stamp(1).to_bytes());
        writer.send(&frame.take()).await.unwrap();

        let mut reader = FramedReader::new(b_read, 64);
        let (mut receiver, _delivered) = NoteReceiver::new();
        assert_eq!(reader.read_header().await.unwrap(), Header::NotesCount);
        receiver.on_count(&mut reader).await.unwrap();
        assert_eq!(reader.read_header().await.unwrap(), Header::NoteBegin);
        receiver.on_begin(&mut reader).await.unwrap();
        assert_eq!(reader.read_header().await.unwrap(), Header::NoteEdited);
        let err = receiver.on_edited(&mut reader).await.unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_text_chunk_overflow_is_rejected() {
        let (a, b) = tokio::io::duplex(256);
        let (_a_read, a_write) = split(a);
        let (b_read, _b_write) = split(b);

        let writer = ChannelWriter::new(a_write);
        let mut frame = SendWindow::new(64);
        frame.push_u8(Header::NotesCount.as_u8());
        frame.push_u32(1);
        frame.push_u8(Header::NoteBegin.as_u8());
        frame.push_u32(2);
        frame.push_u32(0);
        frame.push_u8(Header::NoteTitle.as_u8());
        frame.push_u32(5);
        frame.push_slice(b"hello");
        writer.send(&frame.take()).await.unwrap();

        let mut reader = FramedReader::new(b_read, 64);
        let (mut receiver, _delivered) = NoteReceiver::new();
        assert_eq!(reader.read_header().await.unwrap(), Header::NotesCount);
        receiver.on_count(&mut reader).await.unwrap();
        assert_eq!(reader.read_header().await.unwrap(), Header::NoteBegin);
        receiver.on_begin(&mut reader).await.unwrap();
        assert_eq!(reader.read_header().await.unwrap(), Header::NoteTitle);
        let err = receiver.on_title(&mut reader).await.unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
    }
}
