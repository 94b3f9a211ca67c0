//! Delta (delta-of-delta) transform layered on Simple8 or VarInt.
//!
//! Ordered sequences (caller-declared monotonically non-decreasing) store
//! the first value raw as 8 big-endian bytes followed by a Simple8 stream
//! of the non-negative deltas. A negative delta under the ordered claim
//! fails with `ValueOverflow`, which is the orchestration layer's signal
//! to retry in unordered mode. Unordered sequences are a pure
//! ZigZag/VarInt stream of deltas against the previous value, the first
//! against 0.
//!
//! Delta arithmetic wraps, so sequences spanning the full `i64` range
//! still round-trip exactly.

use crate::buffer::{read_u64_be, CodecBuffer};
use crate::error::{malformed_data, not_allow, value_overflow, Result};
use crate::simple8;
use crate::stream::{Getter, Setter};
use crate::varint;

/// Adapts a value getter into a delta getter.
struct DeltaGetter<'a, G> {
    values: &'a mut G,
    /// Index shift into the underlying sequence: the ordered path skips
    /// the raw-stored base, the unordered path starts at zero.
    offset: usize,
    ordered: bool,
}

impl<G: Getter<i64>> Getter<i64> for DeltaGetter<'_, G> {
    fn get(&mut self, index: usize) -> Result<i64> {
        let at = index + self.offset;
        let current = self.values.get(at)?;
        let previous = if at == 0 { 0 } else { self.values.get(at - 1)? };
        let delta = current.wrapping_sub(previous);
        value_overflow(self.ordered && delta < 0, "negative delta in ordered sequence")?;
        Ok(delta)
    }
}

/// Adapts a value setter into a delta accumulator.
struct DeltaSetter<'a, S> {
    stream: &'a mut S,
    base: i64,
    offset: usize,
    expected: usize,
}

impl<S: Setter<i64>> Setter<i64> for DeltaSetter<'_, S> {
    fn set(&mut self, index: usize, delta: i64) -> Result<()> {
        not_allow(index != self.expected, "delta decoded out of order")?;
        let next = self.base.wrapping_add(delta);
        self.stream.set(self.offset + index, next)?;
        self.base = next;
        self.expected += 1;
        Ok(())
    }
}

/// Encodes `length` values as deltas.
///
/// `ordered` selects the Simple8 path and enforces non-negative deltas;
/// otherwise the deltas go through ZigZag/VarInt.
pub fn encode<G: Getter<i64>>(
    values: &mut G,
    length: usize,
    ordered: bool,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    if ordered {
        buffer.put_u64(values.get(0)? as u64);
        let mut deltas = DeltaGetter {
            values,
            offset: 1,
            ordered: true,
        };
        simple8::encode(&mut deltas, length - 1, buffer)
    } else {
        let mut deltas = DeltaGetter {
            values,
            offset: 0,
            ordered: false,
        };
        varint::encode_seq64(&mut deltas, length, false, buffer)
    }
}

/// Decodes a delta stream, returning the number of values decoded.
pub fn decode<S: Setter<i64>>(slice: &[u8], stream: &mut S, ordered: bool) -> Result<usize> {
    if ordered {
        malformed_data(slice.len() < 8, "ordered delta stream missing base")?;
        let base = read_u64_be(slice, 0) as i64;
        stream.set(0, base)?;
        let mut setter = DeltaSetter {
            stream,
            base,
            offset: 1,
            expected: 0,
        };
        let count = simple8::decode(&slice[8..], &mut setter)?;
        Ok(count + 1)
    } else {
        let mut setter = DeltaSetter {
            stream,
            base: 0,
            offset: 0,
            expected: 0,
        };
        varint::decode_seq64(slice, &mut setter, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::stream::{SliceGetter, VecSetter};

    fn roundtrip(values: &[i64], ordered: bool) -> Vec<i64> {
        let mut buf = CodecBuffer::new();
        encode(&mut SliceGetter(values), values.len(), ordered, &mut buf).unwrap();
        let mut out = VecSetter::with_capacity(values.len());
        let count = decode(buf.as_slice(), &mut out, ordered).unwrap();
        assert_eq!(count, values.len());
        out.into_vec()
    }

    #[test]
    fn test_ordered_roundtrip() {
        let values: Vec<i64> = (0..500).map(|i| 1_600_000_000_000 + i * 250).collect();
        assert_eq!(roundtrip(&values, true), values);
    }

    #[test]
    fn test_ordered_single_value() {
        let values = [-42i64];
        assert_eq!(roundtrip(&values, true), values);
    }

    #[test]
    fn test_unordered_roundtrip() {
        let values = [5i64, -3, 12, 12, -400, i64::MAX, i64::MIN, 0];
        assert_eq!(roundtrip(&values, false), values);
    }

    #[test]
    fn test_ordered_rejects_decreasing() {
        let values = [10i64, 9];
        let mut buf = CodecBuffer::new();
        assert!(matches!(
            encode(&mut SliceGetter(&values), 2, true, &mut buf),
            Err(CodecError::ValueOverflow(_))
        ));
    }

    #[test]
    fn test_ordered_truncated_base() {
        let mut out = VecSetter::<i64>::new();
        assert!(matches!(
            decode(&[1, 2, 3], &mut out, true),
            Err(CodecError::MalformedData(_))
        ));
    }
}
