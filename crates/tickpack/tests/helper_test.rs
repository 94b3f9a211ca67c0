//! End-to-end tests for the preset workflows and fallback chains.

use proptest::prelude::*;
use tickpack::helper::{
    decode_delta2, decode_f32, decode_f64, decode_i32, decode_i64, encode_delta2, encode_f32,
    encode_f64, encode_i32, encode_i64, Codecs,
};
use tickpack::stream::{SliceGetter, VecSetter};

#[test]
fn test_delta2_scenarios() {
    // Ascending run: ordered path, Simple8-packed deltas.
    let ascending: Vec<i64> = (1..=10_000).collect();
    let result = encode_delta2(&mut SliceGetter(&ascending), ascending.len()).unwrap();
    assert_eq!(result.codecs, Codecs::DELTA2 | Codecs::SIMPLE8);
    let mut out = VecSetter::with_capacity(ascending.len());
    let count = decode_delta2(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(count, ascending.len());
    assert_eq!(out.into_vec(), ascending);

    // Descending run: the ordered attempt overflows, zigzag fallback.
    let descending: Vec<i64> = (1..=10_000).rev().collect();
    let result = encode_delta2(&mut SliceGetter(&descending), descending.len()).unwrap();
    assert_eq!(result.codecs, Codecs::DELTA2 | Codecs::ZIGZAG);
    let mut out = VecSetter::with_capacity(descending.len());
    let count = decode_delta2(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(count, descending.len());
    assert_eq!(out.into_vec(), descending);
}

#[test]
fn test_i64_paths() {
    // Small unsigned ramp: Simple8 over varint codes wins.
    let ramp: Vec<i64> = (0..10_000).collect();
    let result = encode_i64(&mut SliceGetter(&ramp), ramp.len(), true).unwrap();
    assert_eq!(result.codecs, Codecs::SIMPLE8 | Codecs::VAR_INT);
    let mut out = VecSetter::with_capacity(ramp.len());
    decode_i64(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), ramp);

    // Signed ramp takes the zigzag flavor.
    let signed: Vec<i64> = (0..10_000).map(|i| 10_000 - i).collect();
    let result = encode_i64(&mut SliceGetter(&signed), signed.len(), false).unwrap();
    assert_eq!(result.codecs, Codecs::SIMPLE8 | Codecs::ZIGZAG);
    let mut out = VecSetter::with_capacity(signed.len());
    decode_i64(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), signed);

    // Full-width noise cannot beat raw storage.
    let noise: Vec<i64> = (0..256)
        .map(|i| (i as i64).wrapping_mul(0x9E37_79B9_7F4A_7C15u64 as i64) | i64::MIN)
        .collect();
    let result = encode_i64(&mut SliceGetter(&noise), noise.len(), true).unwrap();
    assert_eq!(result.codecs, Codecs::RAW);
    assert_eq!(result.data.len(), noise.len() * 8);
    let mut out = VecSetter::with_capacity(noise.len());
    decode_i64(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), noise);
}

#[test]
fn test_i32_paths() {
    let ramp: Vec<i32> = (0..10_000).collect();
    let result = encode_i32(&mut SliceGetter(&ramp), ramp.len(), true).unwrap();
    assert_eq!(result.codecs, Codecs::SIMPLE8 | Codecs::VAR_INT);
    let mut out = VecSetter::with_capacity(ramp.len());
    decode_i32(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), ramp);
}

#[test]
fn test_float_paths() {
    // A gentle ramp compresses well under Gorilla at both widths.
    let doubles: Vec<f64> = (0..10_000).map(|i| (5_000 - i) as f64).collect();
    let result = encode_f64(&mut SliceGetter(&doubles), doubles.len()).unwrap();
    assert_eq!(result.codecs, Codecs::GORILLA);
    let mut out = VecSetter::with_capacity(doubles.len());
    decode_f64(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), doubles);

    let floats: Vec<f32> = (0..10_000).map(|i| (5_000 - i) as f32).collect();
    let result = encode_f32(&mut SliceGetter(&floats), floats.len()).unwrap();
    assert_eq!(result.codecs, Codecs::GORILLA);
    let mut out = VecSetter::with_capacity(floats.len());
    decode_f32(&result.data, result.codecs, &mut out).unwrap();
    assert_eq!(out.into_vec(), floats);
}

#[test]
fn test_float_raw_fallback() {
    // Random bit patterns defeat both XOR codecs.
    let mut state = 0x1234_5678_9ABC_DEFFu64;
    let noise: Vec<f64> = (0..512)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            f64::from_bits(state)
        })
        .collect();
    let result = encode_f64(&mut SliceGetter(&noise), noise.len()).unwrap();
    assert_eq!(result.codecs, Codecs::RAW);
    let mut out = VecSetter::with_capacity(noise.len());
    decode_f64(&result.data, result.codecs, &mut out).unwrap();
    let decoded = out.into_vec();
    for (a, b) in noise.iter().zip(&decoded) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

proptest! {
    /// Whatever path the helper picks, decode restores the input.
    #[test]
    fn test_i64_any_path_roundtrips(
        values in prop::collection::vec(any::<i64>(), 1..200),
        unsigned in any::<bool>(),
    ) {
        let result = encode_i64(&mut SliceGetter(&values), values.len(), unsigned).unwrap();
        let mut out = VecSetter::with_capacity(values.len());
        decode_i64(&result.data, result.codecs, &mut out).unwrap();
        prop_assert_eq!(out.into_vec(), values);
    }

    #[test]
    fn test_f64_any_path_roundtrips(values in prop::collection::vec(any::<u64>().prop_map(f64::from_bits), 1..200)) {
        let result = encode_f64(&mut SliceGetter(&values), values.len()).unwrap();
        let mut out = VecSetter::with_capacity(values.len());
        decode_f64(&result.data, result.codecs, &mut out).unwrap();
        let decoded = out.into_vec();
        prop_assert_eq!(decoded.len(), values.len());
        for (a, b) in values.iter().zip(&decoded) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_delta2_any_order_roundtrips(values in prop::collection::vec(any::<i64>(), 1..200)) {
        let result = encode_delta2(&mut SliceGetter(&values), values.len()).unwrap();
        let mut out = VecSetter::with_capacity(values.len());
        let count = decode_delta2(&result.data, result.codecs, &mut out).unwrap();
        prop_assert_eq!(count, values.len());
        prop_assert_eq!(out.into_vec(), values);
    }
}

#[test]
fn test_empty_sequence_rejected() {
    let empty: [i64; 0] = [];
    assert!(encode_delta2(&mut SliceGetter(&empty), 0).is_err());
    assert!(encode_i64(&mut SliceGetter(&empty), 0, true).is_err());
    let no_floats: [f64; 0] = [];
    assert!(encode_f64(&mut SliceGetter(&no_floats), 0).is_err());
}
