//! # Inklink Testkit
//!
//! Testing utilities for the Inklink sync engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned timestamp encodings for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Seeded device/store pairs for sync scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the 28-byte timestamp encoding:
//!
//! ```rust
//! use inklink_testkit::vectors::{all_vectors, timestamp_from_vector};
//!
//! for vector in all_vectors() {
//!     let stamp = timestamp_from_vector(&vector);
//!     assert_eq!(stamp.to_bytes(), vector.encoded);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use inklink_testkit::generators::timestamp;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_roundtrips(ts in timestamp()) {
//!         let bytes = ts.to_bytes();
//!         prop_assert_eq!(inklink_core::Timestamp::from_bytes(&bytes).unwrap(), ts);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up a device with a seeded store:
//!
//! ```rust
//! use inklink_testkit::fixtures::DeviceFixture;
//!
//! let fixture = DeviceFixture::with_device(0x41);
//! println!("device {}", fixture.device);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_device_fixtures, nth_stamp, DeviceFixture};
pub use generators::{association, device_id, note, note_stamp, timestamp, tombstone};
pub use vectors::{all_vectors, timestamp_from_vector, verify_all_vectors, GoldenVector};
