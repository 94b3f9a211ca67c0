//! Gorilla XOR compression for floats and doubles.
//!
//! Values are compared as raw IEEE-754 bit patterns. After the first
//! value (stored at full width) each value contributes:
//!
//! - `0` when the XOR with the previous value is zero;
//! - `1 0` + significant bits when the leading/trailing-zero block is
//!   unchanged from the previous non-zero XOR;
//! - `1 1` + 13 bits of block metadata (6-bit leading-zero count, 7-bit
//!   significant-bit count) + significant bits when the block changed.
//!
//! Because the codec works on bit patterns, NaN payloads and signed
//! zeros round-trip exactly.

use crate::bits::{BitReader, BitWriter};
use crate::buffer::CodecBuffer;
use crate::error::{malformed_data, not_allow, value_overflow, Result};
use crate::stream::{Getter, Setter};

const MAX_LEADING_ZERO_BITS: u32 = 6;
const MAX_BLOCK_SIZE_BITS: u32 = 7;
const BLOCK_META_BITS: u32 = MAX_LEADING_ZERO_BITS + MAX_BLOCK_SIZE_BITS;
const BLOCK_SIZE_MASK: u32 = (1 << MAX_BLOCK_SIZE_BITS) - 1;

/// Writes one value's control bits, metadata and significant bits.
fn encode_block(writer: &mut BitWriter, prev: u32, meta: u32, value: u64) -> Result<()> {
    if value == 0 {
        writer.write_bit(false);
    } else {
        writer.write_bit(true);
        let changed = meta != prev;
        writer.write_bit(changed);
        if changed {
            writer.write_bits(meta as u64, BLOCK_META_BITS)?;
        }
        writer.write_bits(value, meta & BLOCK_SIZE_MASK)?;
    }
    Ok(())
}

/// Encodes `length` doubles with Gorilla XOR compression.
pub fn encode64<G: Getter<f64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    let mut writer = BitWriter::new();
    let mut prev_block = 0u32;
    let mut previous = values.get(0)?.to_bits();
    writer.write_bits(previous, 64)?;
    for n in 1..length {
        let current = values.get(n)?.to_bits();
        let xor = previous ^ current;
        let leading = xor.leading_zeros();
        let trailing = xor.trailing_zeros();
        let diff_bits = if xor == 0 { 0 } else { xor >> trailing };
        let diff_size = if diff_bits == 0 {
            0
        } else {
            64 - leading - trailing
        };
        value_overflow(diff_size >= 1 << MAX_BLOCK_SIZE_BITS, "block size field")?;

        let curr_block = (leading << MAX_BLOCK_SIZE_BITS) | diff_size;
        encode_block(&mut writer, prev_block, curr_block, diff_bits)?;
        prev_block = curr_block;
        previous = current;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a Gorilla stream of doubles.
pub fn decode64<S: Setter<f64>>(slice: &[u8], stream: &mut S) -> Result<()> {
    not_allow(slice.len() < 2, "gorilla stream too short")?;
    let mut reader = BitReader::new(slice)?;
    let mut trailing = 0u32;
    let mut block_size = 0u32;
    let mut count = 0;
    let mut value = reader.read_bits(64)?;
    stream.set(count, f64::from_bits(value))?;
    count += 1;
    while reader.has_more() {
        let mut bits = 0u64;
        if reader.read_bit()? {
            if reader.read_bit()? {
                let meta = reader.read_bits(BLOCK_META_BITS)? as u32;
                block_size = meta & BLOCK_SIZE_MASK;
                let leading = meta >> MAX_BLOCK_SIZE_BITS;
                malformed_data(leading + block_size > 64, "gorilla block exceeds width")?;
                trailing = 64 - block_size - leading;
            }
            malformed_data((block_size | trailing) == 0, "gorilla block never defined")?;
            bits = reader.read_bits(block_size)? << trailing;
        }
        value ^= bits;
        stream.set(count, f64::from_bits(value))?;
        count += 1;
    }
    Ok(())
}

/// Encodes `length` floats with Gorilla XOR compression.
pub fn encode32<G: Getter<f32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
) -> Result<()> {
    not_allow(length == 0, "empty sequence")?;
    let mut writer = BitWriter::new();
    let mut prev_block = 0u32;
    let mut previous = values.get(0)?.to_bits();
    writer.write_bits(previous as u64, 32)?;
    for n in 1..length {
        let current = values.get(n)?.to_bits();
        let xor = previous ^ current;
        let leading = xor.leading_zeros();
        let trailing = xor.trailing_zeros();
        let diff_bits = if xor == 0 { 0 } else { xor >> trailing };
        let diff_size = if diff_bits == 0 {
            0
        } else {
            32 - leading - trailing
        };
        value_overflow(diff_size >= 1 << MAX_BLOCK_SIZE_BITS, "block size field")?;

        let curr_block = (leading << MAX_BLOCK_SIZE_BITS) | diff_size;
        encode_block(&mut writer, prev_block, curr_block, diff_bits as u64)?;
        prev_block = curr_block;
        previous = current;
    }
    writer.finish(buffer);
    Ok(())
}

/// Decodes a Gorilla stream of floats.
pub fn decode32<S: Setter<f32>>(slice: &[u8], stream: &mut S) -> Result<()> {
    not_allow(slice.len() < 2, "gorilla stream too short")?;
    let mut reader = BitReader::new(slice)?;
    let mut trailing = 0u32;
    let mut block_size = 0u32;
    let mut count = 0;
    let mut value = reader.read_bits(32)? as u32;
    stream.set(count, f32::from_bits(value))?;
    count += 1;
    while reader.has_more() {
        let mut bits = 0u32;
        if reader.read_bit()? {
            if reader.read_bit()? {
                let meta = reader.read_bits(BLOCK_META_BITS)? as u32;
                block_size = meta & BLOCK_SIZE_MASK;
                let leading = meta >> MAX_BLOCK_SIZE_BITS;
                malformed_data(leading + block_size > 32, "gorilla block exceeds width")?;
                trailing = 32 - block_size - leading;
            }
            malformed_data((block_size | trailing) == 0, "gorilla block never defined")?;
            bits = (reader.read_bits(block_size)? as u32) << trailing;
        }
        value ^= bits;
        stream.set(count, f32::from_bits(value))?;
        count += 1;
    }
    Ok(())
}
