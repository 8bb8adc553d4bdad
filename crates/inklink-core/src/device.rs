//! Device identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A six-byte device identity, displayed MAC-style.
///
/// Ordering is lexicographic over the raw bytes; connection negotiation uses
/// it as the deterministic tie-break when the coin flip stalls.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub [u8; 6]);

impl DeviceId {
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Generate a random identity.
    pub fn random() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self)
    }
}

impl From<[u8; 6]> for DeviceId {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_mac_style() {
        let id = DeviceId::from_bytes([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(id.to_string(), "de:ad:be:ef:00:01");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = DeviceId::from_bytes([0, 0, 0, 0, 0, 1]);
        let b = DeviceId::from_bytes([0, 0, 0, 0, 0, 2]);
        assert!(a < b);
    }

    #[test]
    fn test_random_ids_differ() {
        // Six bytes of entropy; a collision here means the generator is broken.
        let a = DeviceId::random();
        let b = DeviceId::random();
        assert_ne!(a, b);
    }
}
