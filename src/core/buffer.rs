//! Byte buffers for stream encoding and decoding.
//!
//! All fixed-width fields are little-endian. Variable-length integers use
//! LEB128 with zig-zag mapping for signed values.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::util::{Error, Result};

/// Growable output buffer.
#[derive(Clone, Debug, Default)]
pub struct EncoderBuffer {
    data: Vec<u8>,
}

impl EncoderBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the written bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Drop everything written so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.data.write_u8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.data.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.data.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.data.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a length or count as `u32`, rejecting values that do not fit.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| Error::precondition(format!("length {len} exceeds u32 range")))?;
        self.write_u32(len)
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write an unsigned LEB128 varint.
    pub fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.data.push(byte);
                return;
            }
            self.data.push(byte | 0x80);
        }
    }

    /// Write a signed value as a zig-zag varint.
    pub fn write_signed_varint(&mut self, value: i64) {
        self.write_varint(zigzag_encode(value));
    }
}

/// Read cursor over an encoded stream.
#[derive(Clone, Debug)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecoderBuffer<'a> {
    /// Create a decoder positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fail with `UnexpectedEof` unless `needed` bytes remain.
    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(Error::UnexpectedEof { needed, remaining: self.remaining() });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let mut rest = &self.data[self.pos..];
        let v = rest.read_u8()?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let mut rest = &self.data[self.pos..];
        let v = rest.read_u16::<LittleEndian>()?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let mut rest = &self.data[self.pos..];
        let v = rest.read_u32::<LittleEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        let mut rest = &self.data[self.pos..];
        let v = rest.read_f32::<LittleEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Borrow everything not yet read and advance to the end.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    /// Read an unsigned LEB128 varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift >= 64 || (shift == 63 && byte > 1) {
                return Err(Error::format("varint overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read a zig-zag varint.
    pub fn read_signed_varint(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.read_varint()?))
    }
}

/// Map signed integers onto unsigned so small magnitudes stay small.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_little_endian() {
        let mut enc = EncoderBuffer::new();
        enc.write_u8(0xAB).unwrap();
        enc.write_u16(0x1234).unwrap();
        enc.write_u32(0xDEADBEEF).unwrap();
        enc.write_f32(1.5).unwrap();
        assert_eq!(&enc.as_slice()[..7], &[0xAB, 0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE]);

        let mut dec = DecoderBuffer::new(enc.as_slice());
        assert_eq!(dec.read_u8().unwrap(), 0xAB);
        assert_eq!(dec.read_u16().unwrap(), 0x1234);
        assert_eq!(dec.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(dec.read_f32().unwrap(), 1.5);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_varint_boundaries() {
        let values = [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX];
        let mut enc = EncoderBuffer::new();
        for &v in &values {
            enc.write_varint(v);
        }
        // 127 fits one byte, 128 needs two.
        assert_eq!(enc.as_slice()[2], 0x7f);

        let mut dec = DecoderBuffer::new(enc.as_slice());
        for &v in &values {
            assert_eq!(dec.read_varint().unwrap(), v);
        }
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        for v in [i64::MIN, -1_000_000, -1, 0, 1, 1_000_000, i64::MAX] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn test_truncated_reads() {
        let mut dec = DecoderBuffer::new(&[1, 2]);
        let err = dec.read_u32().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { needed: 4, remaining: 2 }));
        // Failed reads do not consume.
        assert_eq!(dec.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_unterminated_varint() {
        let mut dec = DecoderBuffer::new(&[0x80, 0x80]);
        assert!(dec.read_varint().is_err());

        let overlong = [0xffu8; 11];
        let mut dec = DecoderBuffer::new(&overlong);
        assert!(matches!(dec.read_varint(), Err(Error::Format(_))));
    }
}
