//! Fixed-width encodings used across the ewasm ABI.
//!
//! - Values and balances: unsigned 128-bit, 16 bytes little-endian
//! - Addresses: exactly 20 bytes
//! - Words (storage keys/values, topics, difficulty): 32 bytes, right-padded
//! - Module section sizes: unsigned LEB128 (u32)
//!
//! The [`Reader`] cursor is shared by anything that walks raw bytes, most
//! notably the module boundary scanner.

use crate::types::{Word256, VALUE_BYTE_SIZE, WORD256_LENGTH};

/// Error raised while decoding raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of data at offset {0}")]
    UnexpectedEof(usize),
    #[error("LEB128 value at offset {0} overflows u32")]
    Leb128Overflow(usize),
}

/// A cursor for reading bytes during decoding.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute offset. Offsets past the end are
    /// allowed; the next read then fails with `UnexpectedEof`.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::UnexpectedEof(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read an unsigned LEB128 value of at most 5 bytes that fits in a u32.
    pub fn read_var_u32(&mut self) -> Result<u32, CodecError> {
        let start = self.pos;
        let mut result: u32 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            let low = u32::from(byte & 0x7f);
            // the fifth byte may only contribute the top 4 bits
            if shift == 28 && (byte & 0x70) != 0 {
                return Err(CodecError::Leb128Overflow(start));
            }
            result |= low << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 28 {
                return Err(CodecError::Leb128Overflow(start));
            }
        }
    }
}

/// Right-pad `data` with zeros to exactly `len` bytes, truncating if longer.
pub fn right_pad_bytes(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let n = data.len().min(len);
    out[..n].copy_from_slice(&data[..n]);
    out
}

/// Right-pad (or truncate) `data` into a 32-byte word.
pub fn right_pad_word256(data: &[u8]) -> Word256 {
    let mut word = [0u8; WORD256_LENGTH];
    let n = data.len().min(WORD256_LENGTH);
    word[..n].copy_from_slice(&data[..n]);
    word
}

/// Encode a value as the 16-byte little-endian ABI form.
pub fn value_to_le_bytes(value: u128) -> [u8; VALUE_BYTE_SIZE] {
    value.to_le_bytes()
}
