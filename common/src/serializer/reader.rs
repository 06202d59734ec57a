use crate::crypto::{Hash, HASH_SIZE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Not enough bytes: requested {0}, remaining {1}")]
    NotEnoughBytes(usize, usize),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("Invalid hexadecimal input")]
    InvalidHex,
    #[error("Invalid value")]
    InvalidValue,
}

// Cursor over a byte slice being decoded
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn read_slice(&mut self, size: usize) -> Result<&'a [u8], ReaderError> {
        let remaining = self.remaining();
        if remaining < size {
            return Err(ReaderError::NotEnoughBytes(size, remaining));
        }
        let slice = &self.bytes[self.offset..self.offset + size];
        self.offset += size;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let bytes = self.read_slice(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], ReaderError> {
        self.read_slice(size)
    }

    pub fn read_hash(&mut self) -> Result<Hash, ReaderError> {
        let bytes = self.read_slice(HASH_SIZE)?;
        Ok(Hash::new(bytes.try_into().unwrap()))
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn total_read(&self) -> usize {
        self.offset
    }
}
