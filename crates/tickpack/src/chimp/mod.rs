//! Chimp compression with a ring-size selector prefix.
//!
//! The stream opens with one byte holding `log2(N)` (0 selects plain
//! Chimp, otherwise the ChimpN lookback variant with an N-slot ring),
//! followed by the bit stream of the selected codec. Decoding reads the
//! prefix back, so the ring size never needs to travel out of band.

mod lookback;
mod plain;

use crate::buffer::CodecBuffer;
use crate::error::{not_allow, Result};
use crate::stream::{Getter, Setter};

/// Encodes `length` doubles; `n == 0` selects plain Chimp, otherwise a
/// power-of-two ring size in `[4, 256]`.
pub fn encode64<G: Getter<f64>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
    n: usize,
) -> Result<()> {
    if n == 0 {
        buffer.put_u8(0);
        plain::encode64(values, length, buffer)
    } else {
        lookback::check_ring_size(n)?;
        buffer.put_u8(n.trailing_zeros() as u8);
        lookback::encode64(values, length, buffer, n)
    }
}

/// Decodes a Chimp stream of doubles, honoring the ring-size prefix.
pub fn decode64<S: Setter<f64>>(slice: &[u8], stream: &mut S) -> Result<()> {
    let n = read_ring_size(slice)?;
    if n == 0 {
        plain::decode64(&slice[1..], stream)
    } else {
        lookback::decode64(&slice[1..], stream, n)
    }
}

/// Encodes `length` floats; `n == 0` selects plain Chimp, otherwise a
/// power-of-two ring size in `[4, 256]`.
pub fn encode32<G: Getter<f32>>(
    values: &mut G,
    length: usize,
    buffer: &mut CodecBuffer,
    n: usize,
) -> Result<()> {
    if n == 0 {
        buffer.put_u8(0);
        plain::encode32(values, length, buffer)
    } else {
        lookback::check_ring_size(n)?;
        buffer.put_u8(n.trailing_zeros() as u8);
        lookback::encode32(values, length, buffer, n)
    }
}

/// Decodes a Chimp stream of floats, honoring the ring-size prefix.
pub fn decode32<S: Setter<f32>>(slice: &[u8], stream: &mut S) -> Result<()> {
    let n = read_ring_size(slice)?;
    if n == 0 {
        plain::decode32(&slice[1..], stream)
    } else {
        lookback::decode32(&slice[1..], stream, n)
    }
}

fn read_ring_size(slice: &[u8]) -> Result<usize> {
    not_allow(slice.is_empty(), "chimp stream missing ring prefix")?;
    let log2n = slice[0] as u32;
    if log2n == 0 {
        return Ok(0);
    }
    not_allow(!(2..=8).contains(&log2n), "ring prefix out of range")?;
    Ok(1 << log2n)
}
