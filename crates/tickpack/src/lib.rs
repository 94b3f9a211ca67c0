//! Tickpack - lossless numeric compression for time series
//!
//! This crate provides a family of byte- and bit-level codecs for
//! sequences of 32/64-bit integers and floating-point values, plus a
//! small orchestration layer that picks among them per sequence.
//!
//! # Components
//!
//! - [`bits`]: exact MSB-first bit writer/reader with a padding trailer
//! - [`varint`]: LEB128 VarInt and ZigZag, including streaming adapters
//! - [`simple8`]: 64-bit word packing with an O(n) selector search
//! - [`delta2`]: delta transform over Simple8 or VarInt
//! - [`gorilla`]: XOR float compression (Facebook Gorilla, VLDB 2015)
//! - [`chimp`]: adaptive float compression with ring-buffer lookback
//!   (Chimp, VLDB 2022)
//! - [`helper`]: try-cheapest-first preset workflows and codec flags
//!
//! # Example
//!
//! ```rust
//! use tickpack::helper::{decode_delta2, encode_delta2, Codecs};
//! use tickpack::stream::VecSetter;
//!
//! let timestamps: Vec<i64> = (0..1000).map(|i| 1_700_000_000 + i * 60).collect();
//! let mut getter = |i: usize| timestamps[i];
//!
//! let result = encode_delta2(&mut getter, timestamps.len()).unwrap();
//! assert_eq!(result.codecs, Codecs::DELTA2 | Codecs::SIMPLE8);
//!
//! let mut restored = VecSetter::with_capacity(timestamps.len());
//! let count = decode_delta2(&result.data, result.codecs, &mut restored).unwrap();
//! assert_eq!(count, timestamps.len());
//! assert_eq!(restored.into_vec(), timestamps);
//! ```
//!
//! Every codec works on raw bit patterns, so float special values (NaN
//! payloads, signed zeros, subnormals) round-trip exactly. Encode and
//! decode calls are synchronous and keep all mutable state call-local;
//! distinct calls on distinct threads need no locking as long as each
//! uses its own buffers.

#![deny(missing_docs)]

pub mod bits;
pub mod buffer;
pub mod chimp;
pub mod delta2;
pub mod error;
pub mod gorilla;
pub mod helper;
pub mod simple8;
pub mod stream;
pub mod varint;

pub use buffer::CodecBuffer;
pub use error::{CodecError, Result};
pub use helper::{CodecResult, Codecs};
pub use stream::{Getter, Setter};
