//! Property-based tests for VarInt and ZigZag sequence codecs.

use proptest::prelude::*;
use tickpack::buffer::CodecBuffer;
use tickpack::stream::{SliceGetter, VecSetter};
use tickpack::varint;

fn roundtrip64(values: &[i64], unsigned: bool) -> Vec<i64> {
    let mut buf = CodecBuffer::new();
    varint::encode_seq64(&mut SliceGetter(values), values.len(), unsigned, &mut buf).unwrap();
    let mut out = VecSetter::with_capacity(values.len());
    let count = varint::decode_seq64(buf.as_slice(), &mut out, unsigned).unwrap();
    assert_eq!(count, values.len());
    out.into_vec()
}

fn roundtrip32(values: &[i32], unsigned: bool) -> Vec<i32> {
    let mut buf = CodecBuffer::new();
    varint::encode_seq32(&mut SliceGetter(values), values.len(), unsigned, &mut buf).unwrap();
    let mut out = VecSetter::with_capacity(values.len());
    let count = varint::decode_seq32(buf.as_slice(), &mut out, unsigned).unwrap();
    assert_eq!(count, values.len());
    out.into_vec()
}

proptest! {
    #[test]
    fn test_seq64_roundtrip(values in prop::collection::vec(any::<i64>(), 0..500)) {
        prop_assert_eq!(roundtrip64(&values, true), values.clone());
        prop_assert_eq!(roundtrip64(&values, false), values);
    }

    #[test]
    fn test_seq32_roundtrip(values in prop::collection::vec(any::<i32>(), 0..500)) {
        prop_assert_eq!(roundtrip32(&values, true), values.clone());
        prop_assert_eq!(roundtrip32(&values, false), values);
    }

    /// Small magnitudes stay small under zigzag, regardless of sign.
    #[test]
    fn test_zigzag_keeps_small_values_short(value in -63i64..=63) {
        let mut buf = CodecBuffer::new();
        let values = [value];
        varint::encode_seq64(&mut SliceGetter(&values), 1, false, &mut buf).unwrap();
        prop_assert_eq!(buf.position(), 1);
    }

    /// Encoding the same sequence twice is byte-identical.
    #[test]
    fn test_deterministic(values in prop::collection::vec(any::<i64>(), 0..200)) {
        let mut a = CodecBuffer::new();
        let mut b = CodecBuffer::new();
        varint::encode_seq64(&mut SliceGetter(&values), values.len(), false, &mut a).unwrap();
        varint::encode_seq64(&mut SliceGetter(&values), values.len(), false, &mut b).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
    }
}

#[test]
fn test_boundary_lengths() {
    // Each 7-bit group boundary adds one byte.
    let mut buf = [0u8; varint::MAX_BYTES_64];
    for (value, expected) in [
        (0u64, 1),
        (0x7F, 1),
        (0x80, 2),
        (0x3FFF, 2),
        (0x4000, 3),
        (u64::from(u32::MAX), 5),
        (u64::MAX, 10),
    ] {
        assert_eq!(varint::encode64(value, &mut buf), expected);
    }
}

#[test]
fn test_truncated_input_is_malformed() {
    let mut buf = CodecBuffer::new();
    let values = [i64::MAX];
    varint::encode_seq64(&mut SliceGetter(&values), 1, true, &mut buf).unwrap();
    let bytes = buf.as_slice();
    let mut out = VecSetter::<i64>::new();
    assert!(varint::decode_seq64(&bytes[..bytes.len() - 1], &mut out, true).is_err());
}

#[test]
fn test_unsigned_signed_wire_mismatch_still_decodes_values() {
    // Signed values encoded unsigned use the raw two's-complement bit
    // pattern: -1 costs the full 10 bytes but still round-trips.
    assert_eq!(roundtrip64(&[-1, -2, i64::MIN], true), vec![-1, -2, i64::MIN]);
}
