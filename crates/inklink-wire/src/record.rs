//! Fixed-size record encodings for the counted streams.

use inklink_core::{Association, NoteStamp, Timestamp, Tombstone};

use crate::error::Result;
use crate::window::SendWindow;

/// A fixed-size record that travels inside counted sub-chunks.
pub trait WireRecord: Sized + Send + Sync {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the encoding to a send window. The caller has already checked
    /// that [`WireRecord::SIZE`] bytes fit.
    fn encode(&self, out: &mut SendWindow);

    /// Decode from exactly [`WireRecord::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Result<Self>;
}

impl WireRecord for Timestamp {
    const SIZE: usize = Timestamp::ENCODED_LEN;

    fn encode(&self, out: &mut SendWindow) {
        out.push_slice(&self.to_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Timestamp::try_from(bytes)?)
    }
}

impl WireRecord for NoteStamp {
    const SIZE: usize = 2 * Timestamp::ENCODED_LEN;

    fn encode(&self, out: &mut SendWindow) {
        out.push_slice(&self.created.to_bytes());
        out.push_slice(&self.edited.to_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let created = Timestamp::try_from(&bytes[..Timestamp::ENCODED_LEN])?;
        let edited = Timestamp::try_from(&bytes[Timestamp::ENCODED_LEN..])?;
        Ok(Self { created, edited })
    }
}

impl WireRecord for Association {
    const SIZE: usize = 2 * Timestamp::ENCODED_LEN;

    fn encode(&self, out: &mut SendWindow) {
        out.push_slice(&self.parent.to_bytes());
        out.push_slice(&self.child.to_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let parent = Timestamp::try_from(&bytes[..Timestamp::ENCODED_LEN])?;
        let child = Timestamp::try_from(&bytes[Timestamp::ENCODED_LEN..])?;
        Ok(Self { parent, child })
    }
}

impl WireRecord for Tombstone {
    const SIZE: usize = Timestamp::ENCODED_LEN;

    fn encode(&self, out: &mut SendWindow) {
        out.push_slice(&self.created.to_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(Timestamp::try_from(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(milli: u32) -> Timestamp {
        Timestamp::new(2024, 4, 2, 18, 45, 30, milli).unwrap()
    }

    fn roundtrip<T: WireRecord + PartialEq + std::fmt::Debug>(record: T) {
        let mut window = SendWindow::new(128);
        record.encode(&mut window);
        let frame = window.take();
        assert_eq!(frame.len(), T::SIZE);
        assert_eq!(T::decode(&frame).unwrap(), record);
    }

    #[test]
    fn test_record_encodings() {
        roundtrip(stamp(1));
        roundtrip(NoteStamp::new(stamp(1), stamp(2)));
        roundtrip(Association::new(stamp(3), stamp(4)));
        roundtrip(Tombstone::new(stamp(5)));
    }

    #[test]
    fn test_decode_rejects_invalid_calendar_bytes() {
        let bytes = [0xffu8; 28];
        assert!(Timestamp::decode(&bytes).is_err());
        assert!(Tombstone::decode(&bytes).is_err());
    }
}
