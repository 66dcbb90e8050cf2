use crate::error::{Error, Result};

/// Bounds-checked, big-endian view over an immutable byte buffer.
///
/// Every read checks `offset + len` against the buffer length (with overflow
/// checks) and returns [`Error::OutOfRange`] instead of panicking. All format
/// parsers read the raw container through this type.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Returns the total length of the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying buffer.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads a big-endian `u16` at `offset`.
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let b = self.read_slice(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a big-endian `u32` at `offset`.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let b = self.read_slice(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Borrows `len` bytes starting at `offset`.
    pub fn read_slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| self.out_of_range(offset, len))?;
        self.data
            .get(offset..end)
            .ok_or_else(|| self.out_of_range(offset, len))
    }

    /// Borrows the half-open range `start..end`.
    pub fn read_range(&self, start: usize, end: usize) -> Result<&'a [u8]> {
        if end < start {
            return Err(self.out_of_range(start, 0));
        }
        self.read_slice(start, end - start)
    }

    /// Number of bytes available from `offset` to the end of the buffer.
    pub fn remaining(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(offset)
    }

    fn out_of_range(&self, offset: usize, len: usize) -> Error {
        Error::OutOfRange {
            offset,
            len,
            available: self.data.len(),
        }
    }
}
