use byteorder::{BigEndian, ByteOrder};

use crate::{ClassWriterError, Result};

/// A growable, append-only big-endian byte buffer.
///
/// Capacity is doubled whenever an append would overflow it. Previously written `u2`/`u4`
/// slots can be patched in place once their final value is known.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByteVector {
    data: Vec<u8>,
}

impl ByteVector {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.enlarge(1);
        self.data.push(value);
        self
    }

    /// Puts a `u1` followed by a `u2`.
    pub fn put_12(&mut self, byte: u8, short: u16) -> &mut Self {
        self.put_u8(byte).put_u16(short)
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.put_bytes(&value.to_be_bytes())
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.put_bytes(&value.to_be_bytes())
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.put_bytes(&value.to_be_bytes())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.enlarge(bytes.len());
        self.data.extend_from_slice(bytes);
        self
    }

    /// Puts a `u2` length followed by the modified UTF-8 encoding of `value`.
    ///
    /// NUL and every UTF-16 code unit above `0x7F` take two or three bytes; supplementary
    /// characters are written as their two surrogates.
    pub fn put_utf8(&mut self, value: &str) -> Result<&mut Self> {
        let length = modified_utf8_len(value);
        if length > u16::MAX as usize {
            return Err(ClassWriterError::Utf8TooLong(length));
        }

        self.enlarge(2 + length);
        self.put_u16(length as u16);
        for unit in value.encode_utf16() {
            match unit {
                0x0001..=0x007F => {
                    self.data.push(unit as u8);
                }
                0x0000 | 0x0080..=0x07FF => {
                    self.data.push((0xC0 | ((unit >> 6) & 0x1F)) as u8);
                    self.data.push((0x80 | (unit & 0x3F)) as u8);
                }
                _ => {
                    self.data.push((0xE0 | ((unit >> 12) & 0x0F)) as u8);
                    self.data.push((0x80 | ((unit >> 6) & 0x3F)) as u8);
                    self.data.push((0x80 | (unit & 0x3F)) as u8);
                }
            }
        }

        Ok(self)
    }

    /// Overwrites the `u1` at `offset`, which must have been written before.
    pub fn patch_u8(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    /// Overwrites the `u2` at `offset`, which must have been written before.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        BigEndian::write_u16(&mut self.data[offset..offset + 2], value);
    }

    /// Overwrites the `u4` at `offset`, which must have been written before.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        BigEndian::write_u32(&mut self.data[offset..offset + 4], value);
    }

    fn enlarge(&mut self, size: usize) {
        let minimal = self.data.len() + size;
        if minimal <= self.data.capacity() {
            return;
        }

        let doubled = 2 * self.data.capacity();
        let target = doubled.max(minimal);
        self.data.reserve_exact(target - self.data.len());
    }
}

pub(crate) fn modified_utf8_len(value: &str) -> usize {
    value
        .encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}



#[cfg(test)]
mod patch_tests {
    use super::*;

    #[test]
    fn it_should_patch_a_reserved_short() {
        let mut bytes = ByteVector::new();
        bytes.put_u8(0xFF).put_u16(0).put_u8(0xFF);
        bytes.patch_u16(1, 0x1234);

        assert_eq!(&[0xFF, 0x12, 0x34, 0xFF], bytes.as_slice());
    }

    #[test]
    fn it_should_patch_a_reserved_int() {
        let mut bytes = ByteVector::new();
        bytes.put_u32(0);
        bytes.patch_u32(0, 42);

        assert_eq!(&[0, 0, 0, 42], bytes.as_slice());
    }
}
