//! Simple8-style word packing of small non-negative integers.
//!
//! Each output word is 8 bytes big-endian: the top 4 bits select how many
//! integers the word carries and at what width, the low 60 bits hold the
//! packed fields LSB-first. The encoder always packs the largest number
//! of values the upcoming data allows, using the O(n) selector search in
//! [`lookup`].

mod lookup;
mod packing;

pub use packing::{Packing, SELECTORS};

use crate::buffer::{read_u64_be, CodecBuffer};
use crate::error::{malformed_data, Result};
use crate::stream::{Getter, Setter};

/// Encodes `length` values into 64-bit packed words.
///
/// Every value must be non-negative and below `2^60`; anything wider
/// fails with `ValueOverflow`.
pub fn encode<G: Getter<i64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    let mut pos = 0;
    while pos < length {
        let packing = lookup::lookup_packing(values, pos, length)?;
        buffer.put_u64(packing.pack(values, pos)?);
        pos += packing.integers;
    }
    Ok(())
}

/// Decodes a packed word stream, returning the number of values decoded.
///
/// The slice length must be a multiple of 8 (`MalformedData` otherwise).
pub fn decode<S: Setter<i64>>(slice: &[u8], stream: &mut S) -> Result<usize> {
    malformed_data(
        slice.len() % 8 != 0,
        "simple8 stream not a whole number of words",
    )?;
    let mut count = 0;
    let mut pos = 0;
    while pos < slice.len() {
        let word = read_u64_be(slice, pos);
        let packing = &SELECTORS[(word >> 60) as usize];
        packing.unpack(word, stream, count)?;
        count += packing.integers;
        pos += 8;
    }
    Ok(count)
}
