//! Fixed-size byte windows for the framed channel.
//!
//! The receive side accumulates socket reads in a [`RecvWindow`]; consuming
//! bytes moves a start cursor, and [`RecvWindow::compact`] reclaims the
//! consumed prefix when the tail runs out of free space. Unread bytes are
//! never dropped: compaction slides them to the front in order.
//!
//! The send side packs one outgoing flush into a [`SendWindow`] and hands the
//! whole thing to the writer at once.

use bytes::{BufMut, Bytes, BytesMut};

/// Smallest window that still fits every fixed frame the protocol emits.
pub const MIN_WINDOW_LEN: usize = 64;

/// Fixed-size receive window with explicit compaction.
#[derive(Debug)]
pub struct RecvWindow {
    buf: Box<[u8]>,
    /// Next unread byte.
    start: usize,
    /// One past the last filled byte.
    end: usize,
}

impl RecvWindow {
    pub fn new(len: usize) -> Self {
        Self {
            buf: vec![0u8; len].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        self.end - self.start
    }

    /// Free space in the tail, before compaction.
    pub fn free(&self) -> usize {
        self.buf.len() - self.end
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Slide unread bytes to the front, reclaiming the consumed prefix.
    pub fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
    }

    /// The writable tail, for a socket read to fill.
    pub fn free_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.end..]
    }

    /// Record that `n` bytes were written into the free tail.
    pub fn advance_end(&mut self, n: usize) {
        debug_assert!(n <= self.free());
        self.end += n;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consuming accessors. Each returns `None` when too few bytes are
    // buffered; the async reader refills and retries.
    // ─────────────────────────────────────────────────────────────────────────

    /// Look at the next unread byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        (self.available() >= 1).then(|| self.buf[self.start])
    }

    pub fn take_u8(&mut self) -> Option<u8> {
        let v = self.peek_u8()?;
        self.start += 1;
        Some(v)
    }

    pub fn take_u32(&mut self) -> Option<u32> {
        if self.available() < 4 {
            return None;
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.buf[self.start..self.start + 4]);
        self.start += 4;
        Some(u32::from_be_bytes(word))
    }

    /// Copy up to `dst.len()` unread bytes into `dst`, consuming them.
    ///
    /// Returns how many bytes were copied; zero when the window is empty.
    pub fn copy_into(&mut self, dst: &mut [u8]) -> usize {
        let n = self.available().min(dst.len());
        dst[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        n
    }

    /// Consume up to `n` unread bytes, returning how many were discarded.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = self.available().min(n);
        self.start += n;
        n
    }
}

/// Fixed-capacity send window.
///
/// Callers check [`SendWindow::remaining`] before pushing; a flush hands the
/// packed bytes off and leaves the window empty for the next frame.
#[derive(Debug)]
pub struct SendWindow {
    buf: BytesMut,
    cap: usize,
}

impl SendWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(cap),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Space left before the window is full.
    pub fn remaining(&self) -> usize {
        self.cap - self.buf.len()
    }

    pub fn push_u8(&mut self, v: u8) {
        debug_assert!(self.remaining() >= 1);
        self.buf.put_u8(v);
    }

    pub fn push_u32(&mut self, v: u32) {
        debug_assert!(self.remaining() >= 4);
        self.buf.put_u32(v);
    }

    pub fn push_slice(&mut self, s: &[u8]) {
        debug_assert!(self.remaining() >= s.len());
        self.buf.put_slice(s);
    }

    /// Reserve one byte, returning its position for later backfill.
    pub fn reserve_u8(&mut self) -> usize {
        let pos = self.buf.len();
        self.push_u8(0);
        pos
    }

    /// Backfill a byte reserved with [`SendWindow::reserve_u8`].
    pub fn set_u8(&mut self, pos: usize, v: u8) {
        self.buf[pos] = v;
    }

    /// Take the packed bytes, leaving the window empty.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recv_fill_and_consume() {
        let mut w = RecvWindow::new(8);
        w.free_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        w.advance_end(4);

        assert_eq!(w.available(), 4);
        assert_eq!(w.peek_u8(), Some(1));
        assert_eq!(w.take_u8(), Some(1));
        assert_eq!(w.available(), 3);
    }

    #[test]
    fn test_recv_take_u32_needs_four_bytes() {
        let mut w = RecvWindow::new(8);
        w.free_mut()[..3].copy_from_slice(&[0, 0, 1]);
        w.advance_end(3);
        assert_eq!(w.take_u32(), None);

        w.free_mut()[..1].copy_from_slice(&[2]);
        w.advance_end(1);
        assert_eq!(w.take_u32(), Some(0x0000_0102));
    }

    #[test]
    fn test_compact_preserves_unread_bytes_in_order() {
        let mut w = RecvWindow::new(8);
        w.free_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        w.advance_end(8);

        for expect in 1..=5u8 {
            assert_eq!(w.take_u8(), Some(expect));
        }
        assert_eq!(w.free(), 0);

        w.compact();
        assert_eq!(w.available(), 3);
        assert_eq!(w.free(), 5);
        assert_eq!(w.take_u8(), Some(6));
        assert_eq!(w.take_u8(), Some(7));
        assert_eq!(w.take_u8(), Some(8));
    }

    #[test]
    fn test_copy_into_drains_partial() {
        let mut w = RecvWindow::new(8);
        w.free_mut()[..3].copy_from_slice(&[9, 8, 7]);
        w.advance_end(3);

        let mut dst = [0u8; 8];
        assert_eq!(w.copy_into(&mut dst), 3);
        assert_eq!(&dst[..3], &[9, 8, 7]);
        assert_eq!(w.available(), 0);
    }

    #[test]
    fn test_send_pack_and_take() {
        let mut w = SendWindow::new(16);
        w.push_u8(0xab);
        w.push_u32(0x01020304);
        assert_eq!(w.remaining(), 11);

        let frame = w.take();
        assert_eq!(&frame[..], &[0xab, 1, 2, 3, 4]);
        assert!(w.is_empty());
        assert_eq!(w.remaining(), 16);
    }

    #[test]
    fn test_send_reserve_and_backfill() {
        let mut w = SendWindow::new(16);
        w.push_u8(0x02);
        let pos = w.reserve_u8();
        w.push_slice(&[10, 20, 30]);
        w.set_u8(pos, 3);

        let frame = w.take();
        assert_eq!(&frame[..], &[0x02, 3, 10, 20, 30]);
    }
}
