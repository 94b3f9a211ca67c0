//! ChimpN: Chimp with a ring buffer of the last N values.
//!
//! The encoder keeps the last `N` raw bit patterns in a ring plus an
//! index table keyed by each value's low `threshold + 1` bits, where
//! `threshold = log2(width) + log2(N)`. When an earlier value with the
//! same low bits XORs to more than `threshold` trailing zeros, that
//! value is used instead of the immediate predecessor and its ring slot
//! is recorded in the control metadata; this captures periodic patterns
//! the adjacent-value codecs miss. An exact match costs only the control
//! flag plus the `log2(N)`-bit slot.

use crate::bits::{BitReader, BitWriter};
use crate::buffer::CodecBuffer;
use crate::chimp::plain::{
    CTRL_FLAG_BITS, DOUBLE_CENTER_BITS, DOUBLE_CENTER_MASK, FLOAT_CENTER_BITS, FLOAT_CENTER_MASK,
    LEADING_COUNT_BITS, LEADING_COUNT_MASK, LEADING_DECODE, LEADING_ENCODE, LEADING_ROUND,
    MAX_LOG2_32, MAX_LOG2_64,
};
use crate::error::{malformed_data, not_allow, Result};
use crate::stream::{Getter, Setter};

/// Ring size must be a power of two in `[4, 256]` so slot indices fit
/// their bit field exactly.
pub(crate) fn check_ring_size(n: usize) -> Result<()> {
    not_allow(
        !(4..=256).contains(&n) || !n.is_power_of_two(),
        "ring size must be a power of two in [4, 256]",
    )
}

/// Encodes `length` doubles with an `n`-slot lookback ring.
pub fn encode64<G: Getter<f64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
    n: usize,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    check_ring_size(n)?;
    let mut writer = BitWriter::new();

    let log2n = n.trailing_zeros();
    // log2(N) bits name the reference slot, log2(64) bits the center width.
    let threshold = MAX_LOG2_64 + log2n;

    let mut ring = vec![0u64; n];
    let key_mask = (1usize << (threshold + 1)) - 1;
    let mut indices = vec![0usize; 1 << (threshold + 1)];

    let mut index = 0usize;
    let mut current = 0usize;
    let mut prev_leading = 0u32;

    ring[current] = values.get(0)?.to_bits();
    writer.write_bits(ring[current], 64)?;
    indices[ring[current] as usize & key_mask] = index;

    for pos in 1..length {
        let value = values.get(pos)?.to_bits();
        let key = value as usize & key_mask;

        // The most recent earlier value sharing this key, if it is still
        // inside the ring, is the lookback candidate.
        let candidate = indices[key];
        let mut trailing = 0u32;
        let (ref_slot, xor) = if index - candidate < n {
            let probe = value ^ ring[candidate % n];
            trailing = probe.trailing_zeros();
            if trailing > threshold {
                (candidate % n, probe)
            } else {
                trailing = 0;
                (index % n, ring[index % n] ^ value)
            }
        } else {
            (index % n, ring[index % n] ^ value)
        };

        if xor == 0 {
            writer.write_bits(ref_slot as u64, CTRL_FLAG_BITS + log2n)?;
            prev_leading = 65;
        } else {
            let leading = LEADING_ROUND[xor.leading_zeros() as usize];
            if trailing > threshold {
                let significant = 64 - leading - trailing;
                let mut meta = 0b01u64;
                meta = (meta << log2n) | ref_slot as u64;
                meta = (meta << LEADING_COUNT_BITS) | LEADING_ENCODE[leading as usize] as u64;
                meta = (meta << DOUBLE_CENTER_BITS) | significant as u64;
                writer.write_bits(
                    meta,
                    CTRL_FLAG_BITS + log2n + LEADING_COUNT_BITS + DOUBLE_CENTER_BITS,
                )?;
                writer.write_bits(xor >> trailing, significant)?;
                prev_leading = 65;
            } else if leading == prev_leading {
                writer.write_bits(0b10, CTRL_FLAG_BITS)?;
                writer.write_bits(xor, 64 - leading)?;
            } else {
                prev_leading = leading;
                let meta = (0b11 << LEADING_COUNT_BITS) | LEADING_ENCODE[leading as usize];
                writer.write_bits(meta as u64, CTRL_FLAG_BITS + LEADING_COUNT_BITS)?;
                writer.write_bits(xor, 64 - leading)?;
            }
        }
        current = (current + 1) % n;
        ring[current] = value;
        index += 1;
        indices[key] = index;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a ChimpN stream of doubles.
pub fn decode64<S: Setter<f64>>(slice: &[u8], stream: &mut S, n: usize) -> Result<()> {
    not_allow(slice.len() < 2, "chimp stream too short")?;
    check_ring_size(n)?;
    let mut reader = BitReader::new(slice)?;

    let log2n = n.trailing_zeros();
    let mut ring = vec![0u64; n];

    let mut current = 0usize;
    let mut count = 0;
    let mut prev_leading = 0u32;
    let mut value = reader.read_bits(64)?;
    stream.set(count, f64::from_bits(value))?;
    count += 1;
    ring[current] = value;

    while reader.has_more() {
        let mut bits = 0u64;
        match reader.read_bits(CTRL_FLAG_BITS)? {
            0b11 => {
                prev_leading = LEADING_DECODE[reader.read_bits(LEADING_COUNT_BITS)? as usize];
                bits = reader.read_bits(64 - prev_leading)?;
            }
            0b10 => {
                bits = reader.read_bits(64 - prev_leading)?;
            }
            0b01 => {
                let meta =
                    reader.read_bits(log2n + LEADING_COUNT_BITS + DOUBLE_CENTER_BITS)? as u32;
                let slot = (meta >> (LEADING_COUNT_BITS + DOUBLE_CENTER_BITS)) as usize & (n - 1);
                prev_leading =
                    LEADING_DECODE[((meta >> DOUBLE_CENTER_BITS) & LEADING_COUNT_MASK) as usize];
                let mut significant = meta & DOUBLE_CENTER_MASK;
                if significant == 0 {
                    significant = 64;
                }
                malformed_data(significant + prev_leading > 64, "chimp center exceeds width")?;
                let trailing = 64 - significant - prev_leading;
                bits = reader.read_bits(significant)? << trailing;
                value = ring[slot];
            }
            _ => {
                value = ring[reader.read_bits(log2n)? as usize];
            }
        }
        value ^= bits;
        stream.set(count, f64::from_bits(value))?;
        count += 1;

        current = (current + 1) % n;
        ring[current] = value;
    }
    Ok(())
}

/// Encodes `length` floats with an `n`-slot lookback ring.
pub fn encode32<G: Getter<f32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
    n: usize,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    check_ring_size(n)?;
    let mut writer = BitWriter::new();

    let log2n = n.trailing_zeros();
    let threshold = MAX_LOG2_32 + log2n;

    let mut ring = vec![0u32; n];
    let key_mask = (1usize << (threshold + 1)) - 1;
    let mut indices = vec![0usize; 1 << (threshold + 1)];

    let mut index = 0usize;
    let mut current = 0usize;
    let mut prev_leading = 0u32;

    ring[current] = values.get(0)?.to_bits();
    writer.write_bits(ring[current] as u64, 32)?;
    indices[ring[current] as usize & key_mask] = index;

    for pos in 1..length {
        let value = values.get(pos)?.to_bits();
        let key = value as usize & key_mask;

        let candidate = indices[key];
        let mut trailing = 0u32;
        let (ref_slot, xor) = if index - candidate < n {
            let probe = value ^ ring[candidate % n];
            trailing = probe.trailing_zeros();
            if trailing > threshold {
                (candidate % n, probe)
            } else {
                trailing = 0;
                (index % n, ring[index % n] ^ value)
            }
        } else {
            (index % n, ring[index % n] ^ value)
        };

        if xor == 0 {
            writer.write_bits(ref_slot as u64, CTRL_FLAG_BITS + log2n)?;
            prev_leading = 33;
        } else {
            let leading = LEADING_ROUND[xor.leading_zeros() as usize];
            if trailing > threshold {
                let significant = 32 - leading - trailing;
                let mask = (1u64 << significant) - 1;
                let mut meta = 0b01u64;
                meta = (meta << log2n) | ref_slot as u64;
                meta = (meta << LEADING_COUNT_BITS) | LEADING_ENCODE[leading as usize] as u64;
                meta = (meta << FLOAT_CENTER_BITS) | significant as u64;
                writer.write_bits(
                    (meta << significant) | ((xor >> trailing) as u64 & mask),
                    CTRL_FLAG_BITS + log2n + LEADING_COUNT_BITS + FLOAT_CENTER_BITS + significant,
                )?;
                prev_leading = 33;
            } else if leading == prev_leading {
                let significant = 32 - leading;
                let mask = (1u64 << significant) - 1;
                writer.write_bits(
                    (0b10u64 << significant) | (xor as u64 & mask),
                    CTRL_FLAG_BITS + significant,
                )?;
            } else {
                prev_leading = leading;
                let significant = 32 - leading;
                let mask = (1u64 << significant) - 1;
                let meta = ((0b11 << LEADING_COUNT_BITS) | LEADING_ENCODE[leading as usize]) as u64;
                writer.write_bits(
                    (meta << significant) | (xor as u64 & mask),
                    CTRL_FLAG_BITS + LEADING_COUNT_BITS + significant,
                )?;
            }
        }
        current = (current + 1) % n;
        ring[current] = value;
        index += 1;
        indices[key] = index;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a ChimpN stream of floats.
pub fn decode32<S: Setter<f32>>(slice: &[u8], stream: &mut S, n: usize) -> Result<()> {
    not_allow(slice.len() < 2, "chimp stream too short")?;
    check_ring_size(n)?;
    let mut reader = BitReader::new(slice)?;

    let log2n = n.trailing_zeros();
    let mut ring = vec![0u32; n];

    let mut current = 0usize;
    let mut count = 0;
    let mut prev_leading = 0u32;
    let mut value = reader.read_bits(32)? as u32;
    stream.set(count, f32::from_bits(value))?;
    count += 1;
    ring[current] = value;

    while reader.has_more() {
        let mut bits = 0u32;
        match reader.read_bits(CTRL_FLAG_BITS)? {
            0b11 => {
                prev_leading = LEADING_DECODE[reader.read_bits(LEADING_COUNT_BITS)? as usize];
                bits = reader.read_bits(32 - prev_leading)? as u32;
            }
            0b10 => {
                bits = reader.read_bits(32 - prev_leading)? as u32;
            }
            0b01 => {
                let meta =
                    reader.read_bits(log2n + LEADING_COUNT_BITS + FLOAT_CENTER_BITS)? as u32;
                let slot = (meta >> (LEADING_COUNT_BITS + FLOAT_CENTER_BITS)) as usize & (n - 1);
                prev_leading =
                    LEADING_DECODE[((meta >> FLOAT_CENTER_BITS) & LEADING_COUNT_MASK) as usize];
                let mut significant = meta & FLOAT_CENTER_MASK;
                if significant == 0 {
                    significant = 32;
                }
                malformed_data(significant + prev_leading > 32, "chimp center exceeds width")?;
                let trailing = 32 - significant - prev_leading;
                bits = (reader.read_bits(significant)? as u32) << trailing;
                value = ring[slot];
            }
            _ => {
                value = ring[reader.read_bits(log2n)? as usize];
            }
        }
        value ^= bits;
        stream.set(count, f32::from_bits(value))?;
        count += 1;

        current = (current + 1) % n;
        ring[current] = value;
    }
    Ok(())
}
