//! Golden test vectors for the timestamp wire encoding.
//!
//! These vectors pin the 28-byte encoding so that independent implementations
//! can verify they produce identical bytes.

use inklink_core::Timestamp;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Calendar fields: year, month, day, hour, minute, second, millisecond.
    pub fields: [u32; 7],
    /// Expected wire encoding.
    pub encoded: [u8; Timestamp::ENCODED_LEN],
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "unix epoch",
            fields: [1970, 1, 1, 0, 0, 0, 0],
            encoded: [
                0x00, 0x00, 0x07, 0xB2, // 1970
                0x00, 0x00, 0x00, 0x01, // january
                0x00, 0x00, 0x00, 0x01, // day 1
                0x00, 0x00, 0x00, 0x00, // midnight
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ],
        },
        GoldenVector {
            name: "leap day with fractional second",
            fields: [2000, 2, 29, 12, 30, 45, 500],
            encoded: [
                0x00, 0x00, 0x07, 0xD0, // 2000
                0x00, 0x00, 0x00, 0x02, // february
                0x00, 0x00, 0x00, 0x1D, // day 29
                0x00, 0x00, 0x00, 0x0C, // 12h
                0x00, 0x00, 0x00, 0x1E, // 30m
                0x00, 0x00, 0x00, 0x2D, // 45s
                0x00, 0x00, 0x01, 0xF4, // 500ms
            ],
        },
        GoldenVector {
            name: "last instant of 2024",
            fields: [2024, 12, 31, 23, 59, 59, 999],
            encoded: [
                0x00, 0x00, 0x07, 0xE8, // 2024
                0x00, 0x00, 0x00, 0x0C, // december
                0x00, 0x00, 0x00, 0x1F, // day 31
                0x00, 0x00, 0x00, 0x17, // 23h
                0x00, 0x00, 0x00, 0x3B, // 59m
                0x00, 0x00, 0x00, 0x3B, // 59s
                0x00, 0x00, 0x03, 0xE7, // 999ms
            ],
        },
        GoldenVector {
            name: "far future year 9999",
            fields: [9999, 12, 31, 23, 59, 59, 999],
            encoded: [
                0x00, 0x00, 0x27, 0x0F, // 9999
                0x00, 0x00, 0x00, 0x0C, // december
                0x00, 0x00, 0x00, 0x1F, // day 31
                0x00, 0x00, 0x00, 0x17, // 23h
                0x00, 0x00, 0x00, 0x3B, // 59m
                0x00, 0x00, 0x00, 0x3B, // 59s
                0x00, 0x00, 0x03, 0xE7, // 999ms
            ],
        },
    ]
}

/// Build the timestamp a golden vector describes.
pub fn timestamp_from_vector(vector: &GoldenVector) -> Timestamp {
    let [year, month, day, hour, minute, second, millisecond] = vector.fields;
    Timestamp::new(year, month, day, hour, minute, second, millisecond)
        .expect("golden vector fields are valid")
}

/// Verify every golden vector encodes to its pinned bytes.
///
/// Returns one `(name, matches, actual)` row per vector, so a failing
/// implementation can see the bytes it actually produced.
pub fn verify_all_vectors() -> Vec<(String, bool, [u8; Timestamp::ENCODED_LEN])> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = timestamp_from_vector(v).to_bytes();
            (v.name.to_string(), actual == v.encoded, actual)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_encode_to_pinned_bytes() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{name}' encoded to {actual:02X?}");
        }
    }

    #[test]
    fn test_vectors_decode_back_to_their_fields() {
        for vector in all_vectors() {
            let decoded = Timestamp::from_bytes(&vector.encoded)
                .unwrap_or_else(|err| panic!("vector '{}' failed to decode: {err}", vector.name));
            assert_eq!(decoded, timestamp_from_vector(&vector), "{}", vector.name);
        }
    }

    #[test]
    fn test_byte_order_sorts_vectors_chronologically() {
        let mut by_bytes = all_vectors();
        by_bytes.sort_by(|a, b| a.encoded.cmp(&b.encoded));

        let mut by_time = all_vectors();
        by_time.sort_by_key(timestamp_from_vector);

        let bytes_order: Vec<_> = by_bytes.iter().map(|v| v.name).collect();
        let time_order: Vec<_> = by_time.iter().map(|v| v.name).collect();
        assert_eq!(bytes_order, time_order);
    }
}
