//! Bounds-checked access to a contract's linear memory.
//!
//! Every host function reads arguments and writes results through
//! [`LinearMemory`]. Any access outside the current memory size fails with
//! [`AbortCause::MemoryOutOfBounds`], which aborts the invocation.

use std::ops::Range;

use ewasm_primitives::types::{ADDRESS_LENGTH, VALUE_BYTE_SIZE, WORD256_LENGTH};
use ewasm_primitives::{Address, Word256};

use crate::outcome::AbortCause;

/// A view of one instance's linear memory for the duration of a host call.
pub struct LinearMemory<'a> {
    data: &'a mut [u8],
}

impl<'a> LinearMemory<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Current size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn range(&self, ptr: u32, len: u32) -> Result<Range<usize>, AbortCause> {
        let start = ptr as usize;
        start
            .checked_add(len as usize)
            .filter(|end| *end <= self.data.len())
            .map(|end| start..end)
            .ok_or(AbortCause::MemoryOutOfBounds { ptr, len })
    }

    /// Copy `len` bytes starting at `ptr`.
    pub fn read(&self, ptr: u32, len: u32) -> Result<Vec<u8>, AbortCause> {
        let range = self.range(ptr, len)?;
        Ok(self.data[range].to_vec())
    }

    fn read_array<const N: usize>(&self, ptr: u32) -> Result<[u8; N], AbortCause> {
        let range = self.range(ptr, N as u32)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[range]);
        Ok(out)
    }

    pub fn read_address(&self, ptr: u32) -> Result<Address, AbortCause> {
        self.read_array::<ADDRESS_LENGTH>(ptr)
    }

    pub fn read_word(&self, ptr: u32) -> Result<Word256, AbortCause> {
        self.read_array::<WORD256_LENGTH>(ptr)
    }

    /// Read a 16-byte little-endian value.
    pub fn read_value(&self, ptr: u32) -> Result<u128, AbortCause> {
        self.read_array::<VALUE_BYTE_SIZE>(ptr).map(u128::from_le_bytes)
    }

    pub fn write(&mut self, ptr: u32, bytes: &[u8]) -> Result<(), AbortCause> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| AbortCause::MemoryOutOfBounds { ptr, len: u32::MAX })?;
        let range = self.range(ptr, len)?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }
}
