//! The two halves of a framed duplex connection.
//!
//! [`FramedReader`] wraps the read half of a socket behind a compacting
//! receive window and exposes typed accessors that refill transparently.
//! [`ChannelWriter`] wraps the write half behind a lock so the outbound flow
//! and the dispatch loop can interleave whole frames without tearing.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use inklink_core::Timestamp;

use crate::error::{Result, WireError};
use crate::header::Header;
use crate::window::RecvWindow;

/// Buffered reader over the inbound half of a connection.
pub struct FramedReader<R> {
    reader: R,
    window: RecvWindow,
}

impl<R: AsyncRead + Unpin> FramedReader<R> {
    pub fn new(reader: R, window_len: usize) -> Self {
        Self {
            reader,
            window: RecvWindow::new(window_len),
        }
    }

    /// Number of buffered unread bytes.
    pub fn available(&self) -> usize {
        self.window.available()
    }

    /// One blocking read into the window's free space, compacting first when
    /// the tail is full. Returns how many bytes arrived.
    ///
    /// A read of zero bytes means the peer closed the connection, which is an
    /// error at this layer: every stream announces its own end in-band.
    pub async fn fetch(&mut self) -> Result<usize> {
        if self.window.free() == 0 {
            self.window.compact();
            if self.window.free() == 0 {
                return Err(WireError::protocol("receive window full"));
            }
        }
        let n = self.reader.read(self.window.free_mut()).await?;
        if n == 0 {
            return Err(WireError::Transport(
                std::io::ErrorKind::UnexpectedEof.into(),
            ));
        }
        self.window.advance_end(n);
        Ok(n)
    }

    /// Look at the next byte without consuming it.
    pub async fn peek_u8(&mut self) -> Result<u8> {
        loop {
            if let Some(v) = self.window.peek_u8() {
                return Ok(v);
            }
            self.fetch().await?;
        }
    }

    pub async fn read_u8(&mut self) -> Result<u8> {
        loop {
            if let Some(v) = self.window.take_u8() {
                return Ok(v);
            }
            self.fetch().await?;
        }
    }

    pub async fn read_u32(&mut self) -> Result<u32> {
        loop {
            if let Some(v) = self.window.take_u32() {
                return Ok(v);
            }
            self.fetch().await?;
        }
    }

    /// Fill `dst` completely, refilling the window as often as needed. The
    /// bytes need not be contiguous in the window.
    pub async fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < dst.len() {
            if self.window.available() == 0 {
                self.fetch().await?;
            }
            filled += self.window.copy_into(&mut dst[filled..]);
        }
        Ok(())
    }

    /// Consume and discard `n` bytes.
    pub async fn skip(&mut self, n: usize) -> Result<()> {
        let mut left = n;
        while left > 0 {
            if self.window.available() == 0 {
                self.fetch().await?;
            }
            left -= self.window.discard(left);
        }
        Ok(())
    }

    /// Read one header byte; an unknown byte is a protocol violation.
    pub async fn read_header(&mut self) -> Result<Header> {
        let byte = self.read_u8().await?;
        Header::from_u8(byte)
            .ok_or_else(|| WireError::protocol(format!("unknown header byte 0x{byte:02x}")))
    }

    /// Read one 28-byte timestamp, validating the calendar fields.
    pub async fn read_timestamp(&mut self) -> Result<Timestamp> {
        let mut bytes = [0u8; Timestamp::ENCODED_LEN];
        self.read_exact(&mut bytes).await?;
        Ok(Timestamp::from_bytes(&bytes)?)
    }
}

/// Cloneable handle to the outbound half of a connection.
///
/// Every send takes the lock, writes the whole frame, and flushes, so frames
/// from concurrent tasks never interleave mid-frame.
pub struct ChannelWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for ChannelWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: AsyncWrite + Unpin> ChannelWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write one bare control header.
    pub async fn send_header(&self, header: Header) -> Result<()> {
        let mut w = self.inner.lock().await;
        w.write_all(&[header.as_u8()]).await?;
        w.flush().await?;
        Ok(())
    }

    /// Write one packed frame.
    pub async fn send(&self, frame: &[u8]) -> Result<()> {
        let mut w = self.inner.lock().await;
        w.write_all(frame).await?;
        w.flush().await?;
        Ok(())
    }
}
