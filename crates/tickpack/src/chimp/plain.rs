//! Plain Chimp compression (no lookback ring).
//!
//! Like Gorilla, values are XORed against the immediately previous bit
//! pattern, but the control grammar spends two bits up front to separate
//! four cases and rounds leading-zero counts down into eight coarse
//! buckets so they fit a 3-bit code:
//!
//! - `00` identical value;
//! - `01` trailing zeros above the width's log2: explicit
//!   significant-bit count, center bits only;
//! - `10` leading-zero bucket unchanged: all non-leading bits;
//! - `11` new leading-zero bucket + all non-leading bits.

use crate::bits::{BitReader, BitWriter};
use crate::buffer::CodecBuffer;
use crate::error::{malformed_data, not_allow, Result};
use crate::stream::{Getter, Setter};

pub(crate) const CTRL_FLAG_BITS: u32 = 2;
pub(crate) const LEADING_COUNT_BITS: u32 = 3;
pub(crate) const LEADING_COUNT_MASK: u32 = (1 << LEADING_COUNT_BITS) - 1;

pub(crate) const DOUBLE_CENTER_BITS: u32 = 6;
pub(crate) const DOUBLE_CENTER_MASK: u32 = (1 << DOUBLE_CENTER_BITS) - 1;

pub(crate) const FLOAT_CENTER_BITS: u32 = 5;
pub(crate) const FLOAT_CENTER_MASK: u32 = (1 << FLOAT_CENTER_BITS) - 1;

pub(crate) const MAX_LOG2_64: u32 = 6;
pub(crate) const MAX_LOG2_32: u32 = 5;

// The published Chimp bucket tables. The bucket boundaries
// (0,8,12,16,18,20,22,24) are part of the wire format; both sides must
// agree on them bit-exactly, so they are kept verbatim.
pub(crate) const LEADING_ROUND: [u32; 65] = [
    0, 0, 0, 0, 0, 0, 0, 0, //
    8, 8, 8, 8, 12, 12, 12, 12, //
    16, 16, 18, 18, 20, 20, 22, 22, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, 24,
];

pub(crate) const LEADING_ENCODE: [u32; 65] = [
    0, 0, 0, 0, 0, 0, 0, 0, //
    1, 1, 1, 1, 2, 2, 2, 2, //
    3, 3, 4, 4, 5, 5, 6, 6, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, 7,
];

pub(crate) const LEADING_DECODE: [u32; 8] = [0, 8, 12, 16, 18, 20, 22, 24];

/// Encodes `length` doubles with plain Chimp compression.
pub fn encode64<G: Getter<f64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    let mut writer = BitWriter::new();
    let mut prev_leading = 0u32;
    let mut previous = values.get(0)?.to_bits();
    writer.write_bits(previous, 64)?;
    for n in 1..length {
        let current = values.get(n)?.to_bits();
        let xor = previous ^ current;
        if xor == 0 {
            writer.write_bits(0b00, CTRL_FLAG_BITS)?;
            prev_leading = 65;
        } else {
            let leading = LEADING_ROUND[xor.leading_zeros() as usize];
            let trailing = xor.trailing_zeros();
            if trailing > MAX_LOG2_64 {
                let significant = 64 - leading - trailing;
                let meta = (0b01 << (LEADING_COUNT_BITS + DOUBLE_CENTER_BITS))
                    | (LEADING_ENCODE[leading as usize] << DOUBLE_CENTER_BITS)
                    | significant;
                writer.write_bits(
                    meta as u64,
                    CTRL_FLAG_BITS + LEADING_COUNT_BITS + DOUBLE_CENTER_BITS,
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
        previous = current;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a plain Chimp stream of doubles.
pub fn decode64<S: Setter<f64>>(slice: &[u8], stream: &mut S) -> Result<()> {
    not_allow(slice.len() < 2, "chimp stream too short")?;
    let mut reader = BitReader::new(slice)?;
    let mut prev_leading = 0u32;
    let mut count = 0;
    let mut value = reader.read_bits(64)?;
    stream.set(count, f64::from_bits(value))?;
    count += 1;
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
                let meta = reader.read_bits(LEADING_COUNT_BITS + DOUBLE_CENTER_BITS)? as u32;
                prev_leading = LEADING_DECODE[(meta >> DOUBLE_CENTER_BITS) as usize];
                let significant = meta & DOUBLE_CENTER_MASK;
                malformed_data(significant + prev_leading > 64, "chimp center exceeds width")?;
                let trailing = 64 - significant - prev_leading;
                bits = reader.read_bits(significant)? << trailing;
            }
            _ => {}
        }
        value ^= bits;
        stream.set(count, f64::from_bits(value))?;
        count += 1;
    }
    Ok(())
}

/// Encodes `length` floats with plain Chimp compression.
pub fn encode32<G: Getter<f32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    let mut writer = BitWriter::new();
    let mut prev_leading = 0u32;
    let mut previous = values.get(0)?.to_bits();
    writer.write_bits(previous as u64, 32)?;
    for n in 1..length {
        let current = values.get(n)?.to_bits();
        let xor = previous ^ current;
        if xor == 0 {
            writer.write_bits(0b00, CTRL_FLAG_BITS)?;
            prev_leading = 33;
        } else {
            let leading = LEADING_ROUND[xor.leading_zeros() as usize];
            let trailing = xor.trailing_zeros();
            if trailing > MAX_LOG2_32 {
                let significant = 32 - leading - trailing;
                let mask = (1u64 << significant) - 1;
                let meta = ((0b01 << (LEADING_COUNT_BITS + FLOAT_CENTER_BITS))
                    | (LEADING_ENCODE[leading as usize] << FLOAT_CENTER_BITS)
                    | significant) as u64;
                writer.write_bits(
                    (meta << significant) | ((xor >> trailing) as u64 & mask),
                    CTRL_FLAG_BITS + LEADING_COUNT_BITS + FLOAT_CENTER_BITS + significant,
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
        previous = current;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a plain Chimp stream of floats.
pub fn decode32<S: Setter<f32>>(slice: &[u8], stream: &mut S) -> Result<()> {
    not_allow(slice.len() < 2, "chimp stream too short")?;
    let mut reader = BitReader::new(slice)?;
    let mut prev_leading = 0u32;
    let mut count = 0;
    let mut value = reader.read_bits(32)? as u32;
    stream.set(count, f32::from_bits(value))?;
    count += 1;
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
                let meta = reader.read_bits(LEADING_COUNT_BITS + FLOAT_CENTER_BITS)? as u32;
                prev_leading = LEADING_DECODE[(meta >> FLOAT_CENTER_BITS) as usize];
                let significant = meta & FLOAT_CENTER_MASK;
                malformed_data(significant + prev_leading > 32, "chimp center exceeds width")?;
                let trailing = 32 - significant - prev_leading;
                bits = (reader.read_bits(significant)? as u32) << trailing;
            }
            _ => {}
        }
        value ^= bits;
        stream.set(count, f32::from_bits(value))?;
        count += 1;
    }
    Ok(())
}
