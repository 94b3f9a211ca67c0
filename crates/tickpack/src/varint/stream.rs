//! Streaming VarInt adapters for composition with Simple8.
//!
//! The encoders implement [`Getter<i64>`]: each `get` returns the
//! VarInt/ZigZag byte encoding of the underlying value packed
//! little-endian into a single word, so Simple8 can treat the codes as
//! small integers. They also track how many bytes the plain VarInt
//! stream would occupy, which the orchestration layer compares against
//! the packed size. The decoders implement [`Setter<i64>`] and reverse
//! the transform word by word.
//!
//! The adapters borrow their inner stream so a caller can fall back to
//! another codec over the same getter/setter after an attempt fails.

use crate::error::{value_overflow, Result};
use crate::stream::{Getter, Setter};
use crate::varint;

/// Packs the first `len` bytes of `buf` into a word, little-endian.
fn pack_code(buf: &[u8], len: usize) -> u64 {
    let mut code = 0u64;
    for i in (0..len).rev() {
        code = (code << 8) | buf[i] as u64;
    }
    code
}

/// Streams 32-bit integers as VarInt/ZigZag codes.
#[derive(Debug)]
pub struct VarIntEncoder32<'a, G> {
    integers: &'a mut G,
    unsigned: bool,
    bytes: usize,
    counted: usize,
}

impl<'a, G: Getter<i32>> VarIntEncoder32<'a, G> {
    /// Wraps `integers`, raw VarInt when `unsigned`, ZigZag otherwise.
    pub fn new(integers: &'a mut G, unsigned: bool) -> Self {
        Self {
            integers,
            unsigned,
            bytes: 0,
            counted: 0,
        }
    }

    /// Bytes the plain VarInt stream would occupy, counting each index
    /// once even when the caller re-reads it.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl<G: Getter<i32>> Getter<i64> for VarIntEncoder32<'_, G> {
    fn get(&mut self, index: usize) -> Result<i64> {
        let value = self.integers.get(index)?;
        let mut buf = [0u8; varint::MAX_BYTES_32];
        let len = if self.unsigned {
            varint::encode32(value as u32, &mut buf)
        } else {
            varint::encode32(varint::zigzag32(value), &mut buf)
        };
        if index >= self.counted {
            self.bytes += len;
            self.counted = index + 1;
        }
        Ok(pack_code(&buf, len) as i64)
    }
}

/// Streams 64-bit integers as VarInt/ZigZag codes.
#[derive(Debug)]
pub struct VarIntEncoder64<'a, G> {
    longs: &'a mut G,
    unsigned: bool,
    bytes: usize,
    counted: usize,
}

impl<'a, G: Getter<i64>> VarIntEncoder64<'a, G> {
    /// Wraps `longs`, raw VarInt when `unsigned`, ZigZag otherwise.
    pub fn new(longs: &'a mut G, unsigned: bool) -> Self {
        Self {
            longs,
            unsigned,
            bytes: 0,
            counted: 0,
        }
    }

    /// Bytes the plain VarInt stream would occupy, counting each index
    /// once even when the caller re-reads it.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl<G: Getter<i64>> Getter<i64> for VarIntEncoder64<'_, G> {
    fn get(&mut self, index: usize) -> Result<i64> {
        let value = self.longs.get(index)?;
        let mut buf = [0u8; varint::MAX_BYTES_64];
        let len = if self.unsigned {
            varint::encode64(value as u64, &mut buf)
        } else {
            varint::encode64(varint::zigzag64(value), &mut buf)
        };
        // A 9- or 10-byte code cannot ride inside one 64-bit word.
        value_overflow(len > 8, "varint code exceeds word")?;
        if index >= self.counted {
            self.bytes += len;
            self.counted = index + 1;
        }
        Ok(pack_code(&buf, len) as i64)
    }
}

/// Unpacks VarInt/ZigZag codes back into 32-bit integers.
#[derive(Debug)]
pub struct VarIntDecoder32<'a, S> {
    integers: &'a mut S,
    unsigned: bool,
}

impl<'a, S: Setter<i32>> VarIntDecoder32<'a, S> {
    /// Wraps `integers`, raw VarInt when `unsigned`, ZigZag otherwise.
    pub fn new(integers: &'a mut S, unsigned: bool) -> Self {
        Self { integers, unsigned }
    }
}

impl<S: Setter<i32>> Setter<i64> for VarIntDecoder32<'_, S> {
    fn set(&mut self, index: usize, code: i64) -> Result<()> {
        let bytes = (code as u64).to_le_bytes();
        let mut cursor = 0;
        let raw = varint::decode32(&bytes[..varint::MAX_BYTES_32], &mut cursor)?;
        let value = if self.unsigned {
            raw as i32
        } else {
            varint::unzigzag32(raw)
        };
        self.integers.set(index, value)
    }
}

/// Unpacks VarInt/ZigZag codes back into 64-bit integers.
#[derive(Debug)]
pub struct VarIntDecoder64<'a, S> {
    longs: &'a mut S,
    unsigned: bool,
}

impl<'a, S: Setter<i64>> VarIntDecoder64<'a, S> {
    /// Wraps `longs`, raw VarInt when `unsigned`, ZigZag otherwise.
    pub fn new(longs: &'a mut S, unsigned: bool) -> Self {
        Self { longs, unsigned }
    }
}

impl<S: Setter<i64>> Setter<i64> for VarIntDecoder64<'_, S> {
    fn set(&mut self, index: usize, code: i64) -> Result<()> {
        let bytes = (code as u64).to_le_bytes();
        let mut cursor = 0;
        let raw = varint::decode64(&bytes, &mut cursor)?;
        let value = if self.unsigned {
            raw as i64
        } else {
            varint::unzigzag64(raw)
        };
        self.longs.set(index, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{SliceGetter, VecSetter};

    #[test]
    fn test_encoder_code_matches_bytes() {
        let values = [300i64];
        let mut getter = SliceGetter(&values);
        let mut enc = VarIntEncoder64::new(&mut getter, true);
        // 300 -> [0xAC, 0x02] -> 0x02AC as a little-endian packed word.
        assert_eq!(enc.get(0).unwrap(), 0x02AC);
        assert_eq!(enc.bytes(), 2);
    }

    #[test]
    fn test_reread_counts_once() {
        let values = [1i64, 2, 3];
        let mut getter = SliceGetter(&values);
        let mut enc = VarIntEncoder64::new(&mut getter, true);
        for _ in 0..3 {
            for i in 0..3 {
                enc.get(i).unwrap();
            }
        }
        assert_eq!(enc.bytes(), 3);
    }

    #[test]
    fn test_wide_value_overflows_word() {
        let values = [u64::MAX as i64];
        let mut getter = SliceGetter(&values);
        let mut enc = VarIntEncoder64::new(&mut getter, true);
        assert!(enc.get(0).is_err());
    }

    #[test]
    fn test_decoder_reverses_encoder() {
        let values = [0i64, -1, 1, -64, 64, 12345, -98765];
        let mut getter = SliceGetter(&values);
        let mut enc = VarIntEncoder64::new(&mut getter, false);
        let mut out = VecSetter::new();
        let mut dec = VarIntDecoder64::new(&mut out, false);
        for i in 0..values.len() {
            let code = enc.get(i).unwrap();
            dec.set(i, code).unwrap();
        }
        assert_eq!(out.into_vec(), values);
    }
}
