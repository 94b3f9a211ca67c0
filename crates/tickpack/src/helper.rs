//! Preset encode/decode workflows that pick a codec per sequence.
//!
//! Each `encode_*` tries the cheapest adaptive codec first and falls
//! back when it fails with `ValueOverflow` (the "this codec cannot
//! represent this input" signal) or when the adaptive encoding would
//! not beat raw fixed-width storage. The codecs actually layered are recorded as
//! [`Codecs`] flags in the returned [`CodecResult`], and the matching
//! `decode_*` dispatches on those flags.

use bitflags::bitflags;
use tracing::debug;

use crate::buffer::{read_u32_be, read_u64_be, CodecBuffer};
use crate::delta2;
use crate::error::{malformed_data, not_allow, CodecError, Result};
use crate::gorilla;
use crate::simple8;
use crate::stream::{Getter, Setter};
use crate::varint;
use crate::varint::stream::{
    VarIntDecoder32, VarIntDecoder64, VarIntEncoder32, VarIntEncoder64,
};
use crate::chimp;

/// Ring size handed to Chimp by the float/double presets.
const CHIMP_RING: usize = 32;

bitflags! {
    /// The codec layers applied to a byte sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Codecs: u32 {
        /// Fixed-width big-endian storage.
        const RAW = 1;
        /// Gorilla XOR float compression.
        const GORILLA = 1 << 1;
        /// Unsigned VarInt byte encoding.
        const VAR_INT = 1 << 2;
        /// ZigZag-mapped VarInt byte encoding.
        const ZIGZAG = 1 << 3;
        /// Simple8 word packing.
        const SIMPLE8 = 1 << 4;
        /// Delta transform.
        const DELTA2 = 1 << 5;
        /// Chimp float compression.
        const CHIMP = 1 << 6;
    }
}

/// The outcome of a preset encode: the bytes plus the codec layers that
/// produced them, which the matching decoder needs back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecResult {
    /// The encoded byte sequence.
    pub data: Vec<u8>,
    /// The codec layers applied, outermost included.
    pub codecs: Codecs,
}

impl CodecResult {
    fn of(data: Vec<u8>, codecs: Codecs) -> Self {
        debug!(?codecs, bytes = data.len(), "sequence encoded");
        Self { data, codecs }
    }
}

/// Encodes 64-bit integers as deltas: Simple8 over the raw deltas when
/// the sequence is sorted, ZigZag/VarInt deltas otherwise.
pub fn encode_delta2<G: Getter<i64>>(values: &mut G, length: usize) -> Result<CodecResult> {
    not_allow(length == 0, "empty sequence")?;
    let mut buffer = CodecBuffer::with_capacity(64);
    match delta2::encode(values, length, true, &mut buffer) {
        Ok(()) => Ok(CodecResult::of(
            buffer.into_vec(),
            Codecs::DELTA2 | Codecs::SIMPLE8,
        )),
        Err(CodecError::ValueOverflow(_)) => {
            debug!("sequence not sorted, retrying delta2 unordered");
            delta2::encode(values, length, false, buffer.reset())?;
            Ok(CodecResult::of(
                buffer.into_vec(),
                Codecs::DELTA2 | Codecs::ZIGZAG,
            ))
        }
        Err(err) => Err(err),
    }
}

/// Decodes a [`encode_delta2`] result, returning the value count.
pub fn decode_delta2<S: Setter<i64>>(slice: &[u8], codecs: Codecs, stream: &mut S) -> Result<usize> {
    not_allow(
        !codecs.contains(Codecs::DELTA2)
            || !codecs.intersects(Codecs::SIMPLE8 | Codecs::ZIGZAG),
        "flags do not name a delta2 encoding",
    )?;
    delta2::decode(slice, stream, !codecs.contains(Codecs::ZIGZAG))
}

/// Encodes 32-bit integers: Simple8-packed VarInt codes, then a plain
/// VarInt stream, then raw storage, whichever wins first.
pub fn encode_i32<G: Getter<i32>>(
    values: &mut G,
    length: usize,
    unsigned: bool,
) -> Result<CodecResult> {
    not_allow(length == 0, "empty sequence")?;
    let raw_len = length * 4;
    let varint_flag = if unsigned { Codecs::VAR_INT } else { Codecs::ZIGZAG };

    let mut buffer = CodecBuffer::with_capacity(64);
    let mut stream = VarIntEncoder32::new(values, unsigned);
    let packed = simple8::encode(&mut stream, length, &mut buffer);
    let stream_bytes = stream.bytes();
    match packed {
        Ok(()) if buffer.position() < stream_bytes && buffer.position() < raw_len => {
            return Ok(CodecResult::of(
                buffer.into_vec(),
                Codecs::SIMPLE8 | varint_flag,
            ));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {}
        Err(err) => return Err(err),
    }

    varint::encode_seq32(values, length, unsigned, buffer.reset())?;
    if buffer.position() < raw_len {
        return Ok(CodecResult::of(buffer.into_vec(), varint_flag));
    }

    let mut buffer = CodecBuffer::with_capacity(raw_len);
    encode_raw_i32(values, length, &mut buffer)?;
    Ok(CodecResult::of(buffer.into_vec(), Codecs::RAW))
}

/// Decodes an [`encode_i32`] result.
pub fn decode_i32<S: Setter<i32>>(slice: &[u8], codecs: Codecs, stream: &mut S) -> Result<()> {
    if codecs.contains(Codecs::SIMPLE8) {
        let unsigned = codecs.contains(Codecs::VAR_INT);
        simple8::decode(slice, &mut VarIntDecoder32::new(stream, unsigned))?;
        Ok(())
    } else if codecs.intersects(Codecs::VAR_INT | Codecs::ZIGZAG) {
        varint::decode_seq32(slice, stream, codecs.contains(Codecs::VAR_INT))?;
        Ok(())
    } else {
        not_allow(codecs != Codecs::RAW, "flags do not name an i32 encoding")?;
        decode_raw_i32(slice, stream)
    }
}

/// Encodes 64-bit integers: Simple8-packed VarInt codes, then a plain
/// VarInt stream, then raw storage, whichever wins first.
pub fn encode_i64<G: Getter<i64>>(
    values: &mut G,
    length: usize,
    unsigned: bool,
) -> Result<CodecResult> {
    not_allow(length == 0, "empty sequence")?;
    let raw_len = length * 8;
    let varint_flag = if unsigned { Codecs::VAR_INT } else { Codecs::ZIGZAG };

    let mut buffer = CodecBuffer::with_capacity(64);
    let mut stream = VarIntEncoder64::new(values, unsigned);
    let packed = simple8::encode(&mut stream, length, &mut buffer);
    let stream_bytes = stream.bytes();
    match packed {
        Ok(()) if buffer.position() < stream_bytes && buffer.position() < raw_len => {
            return Ok(CodecResult::of(
                buffer.into_vec(),
                Codecs::SIMPLE8 | varint_flag,
            ));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {}
        Err(err) => return Err(err),
    }

    varint::encode_seq64(values, length, unsigned, buffer.reset())?;
    if buffer.position() < raw_len {
        return Ok(CodecResult::of(buffer.into_vec(), varint_flag));
    }

    let mut buffer = CodecBuffer::with_capacity(raw_len);
    encode_raw_i64(values, length, &mut buffer)?;
    Ok(CodecResult::of(buffer.into_vec(), Codecs::RAW))
}

/// Decodes an [`encode_i64`] result.
pub fn decode_i64<S: Setter<i64>>(slice: &[u8], codecs: Codecs, stream: &mut S) -> Result<()> {
    if codecs.contains(Codecs::SIMPLE8) {
        let unsigned = codecs.contains(Codecs::VAR_INT);
        simple8::decode(slice, &mut VarIntDecoder64::new(stream, unsigned))?;
        Ok(())
    } else if codecs.intersects(Codecs::VAR_INT | Codecs::ZIGZAG) {
        varint::decode_seq64(slice, stream, codecs.contains(Codecs::VAR_INT))?;
        Ok(())
    } else {
        not_allow(codecs != Codecs::RAW, "flags do not name an i64 encoding")?;
        decode_raw_i64(slice, stream)
    }
}

/// Encodes floats: Gorilla, then Chimp, then raw storage; the first
/// that beats raw wins.
pub fn encode_f32<G: Getter<f32>>(values: &mut G, length: usize) -> Result<CodecResult> {
    not_allow(length == 0, "empty sequence")?;
    let raw_len = length * 4;

    let mut buffer = CodecBuffer::with_capacity(8 + length * 2);
    match gorilla::encode32(values, length, &mut buffer) {
        Ok(()) if buffer.position() < raw_len => {
            return Ok(CodecResult::of(buffer.into_vec(), Codecs::GORILLA));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {
            debug!("gorilla did not beat raw, trying chimp");
        }
        Err(err) => return Err(err),
    }

    match chimp::encode32(values, length, buffer.reset(), CHIMP_RING) {
        Ok(()) if buffer.position() < raw_len => {
            return Ok(CodecResult::of(buffer.into_vec(), Codecs::CHIMP));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {
            debug!("chimp did not beat raw, storing raw");
        }
        Err(err) => return Err(err),
    }

    let mut buffer = CodecBuffer::with_capacity(raw_len);
    encode_raw_f32(values, length, &mut buffer)?;
    Ok(CodecResult::of(buffer.into_vec(), Codecs::RAW))
}

/// Decodes an [`encode_f32`] result.
pub fn decode_f32<S: Setter<f32>>(slice: &[u8], codecs: Codecs, stream: &mut S) -> Result<()> {
    if codecs == Codecs::GORILLA {
        gorilla::decode32(slice, stream)
    } else if codecs == Codecs::CHIMP {
        chimp::decode32(slice, stream)
    } else {
        not_allow(codecs != Codecs::RAW, "flags do not name an f32 encoding")?;
        decode_raw_f32(slice, stream)
    }
}

/// Encodes doubles: Gorilla, then Chimp, then raw storage; the first
/// that beats raw wins.
pub fn encode_f64<G: Getter<f64>>(values: &mut G, length: usize) -> Result<CodecResult> {
    not_allow(length == 0, "empty sequence")?;
    let raw_len = length * 8;

    let mut buffer = CodecBuffer::with_capacity(8 + length * 2);
    match gorilla::encode64(values, length, &mut buffer) {
        Ok(()) if buffer.position() < raw_len => {
            return Ok(CodecResult::of(buffer.into_vec(), Codecs::GORILLA));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {
            debug!("gorilla did not beat raw, trying chimp");
        }
        Err(err) => return Err(err),
    }

    match chimp::encode64(values, length, buffer.reset(), CHIMP_RING) {
        Ok(()) if buffer.position() < raw_len => {
            return Ok(CodecResult::of(buffer.into_vec(), Codecs::CHIMP));
        }
        Ok(()) | Err(CodecError::ValueOverflow(_)) => {
            debug!("chimp did not beat raw, storing raw");
        }
        Err(err) => return Err(err),
    }

    let mut buffer = CodecBuffer::with_capacity(raw_len);
    encode_raw_f64(values, length, &mut buffer)?;
    Ok(CodecResult::of(buffer.into_vec(), Codecs::RAW))
}

/// Decodes an [`encode_f64`] result.
pub fn decode_f64<S: Setter<f64>>(slice: &[u8], codecs: Codecs, stream: &mut S) -> Result<()> {
    if codecs == Codecs::GORILLA {
        gorilla::decode64(slice, stream)
    } else if codecs == Codecs::CHIMP {
        chimp::decode64(slice, stream)
    } else {
        not_allow(codecs != Codecs::RAW, "flags do not name an f64 encoding")?;
        decode_raw_f64(slice, stream)
    }
}

/// Stores 32-bit integers big-endian at fixed width.
pub fn encode_raw_i32<G: Getter<i32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    for i in 0..length {
        buffer.put_u32(values.get(i)? as u32);
    }
    Ok(())
}

/// Stores 64-bit integers big-endian at fixed width.
pub fn encode_raw_i64<G: Getter<i64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    for i in 0..length {
        buffer.put_u64(values.get(i)? as u64);
    }
    Ok(())
}

/// Stores float bit patterns big-endian at fixed width.
pub fn encode_raw_f32<G: Getter<f32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    for i in 0..length {
        buffer.put_u32(values.get(i)?.to_bits());
    }
    Ok(())
}

/// Stores double bit patterns big-endian at fixed width.
pub fn encode_raw_f64<G: Getter<f64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    for i in 0..length {
        buffer.put_u64(values.get(i)?.to_bits());
    }
    Ok(())
}

/// Reads back fixed-width 32-bit integers.
pub fn decode_raw_i32<S: Setter<i32>>(slice: &[u8], stream: &mut S) -> Result<()> {
    malformed_data(slice.len() % 4 != 0, "raw stream not whole i32 elements")?;
    for i in 0..slice.len() / 4 {
        stream.set(i, read_u32_be(slice, i * 4) as i32)?;
    }
    Ok(())
}

/// Reads back fixed-width 64-bit integers.
pub fn decode_raw_i64<S: Setter<i64>>(slice: &[u8], stream: &mut S) -> Result<()> {
    malformed_data(slice.len() % 8 != 0, "raw stream not whole i64 elements")?;
    for i in 0..slice.len() / 8 {
        stream.set(i, read_u64_be(slice, i * 8) as i64)?;
    }
    Ok(())
}

/// Reads back fixed-width float bit patterns.
pub fn decode_raw_f32<S: Setter<f32>>(slice: &[u8], stream: &mut S) -> Result<()> {
    malformed_data(slice.len() % 4 != 0, "raw stream not whole f32 elements")?;
    for i in 0..slice.len() / 4 {
        stream.set(i, f32::from_bits(read_u32_be(slice, i * 4)))?;
    }
    Ok(())
}

/// Reads back fixed-width double bit patterns.
pub fn decode_raw_f64<S: Setter<f64>>(slice: &[u8], stream: &mut S) -> Result<()> {
    malformed_data(slice.len() % 8 != 0, "raw stream not whole f64 elements")?;
    for i in 0..slice.len() / 8 {
        stream.set(i, f64::from_bits(read_u64_be(slice, i * 8)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{SliceGetter, VecSetter};

    #[test]
    fn test_raw_roundtrip_all_widths() {
        let ints: Vec<i32> = (-50..50).collect();
        let mut buf = CodecBuffer::new();
        encode_raw_i32(&mut SliceGetter(&ints), ints.len(), &mut buf).unwrap();
        let mut out = VecSetter::new();
        decode_raw_i32(buf.as_slice(), &mut out).unwrap();
        assert_eq!(out.into_vec(), ints);

        let doubles: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        let mut buf = CodecBuffer::new();
        encode_raw_f64(&mut SliceGetter(&doubles), doubles.len(), &mut buf).unwrap();
        let mut out = VecSetter::new();
        decode_raw_f64(buf.as_slice(), &mut out).unwrap();
        assert_eq!(out.into_vec(), doubles);
    }

    #[test]
    fn test_raw_ragged_rejected() {
        let mut out = VecSetter::<i64>::new();
        assert!(decode_raw_i64(&[0u8; 12], &mut out).is_err());
    }

    #[test]
    fn test_decode_flag_validation() {
        let mut out = VecSetter::<i64>::new();
        assert!(decode_delta2(&[0u8; 8], Codecs::SIMPLE8, &mut out).is_err());
        assert!(decode_i64(&[0u8; 8], Codecs::GORILLA, &mut out).is_err());
    }
}
