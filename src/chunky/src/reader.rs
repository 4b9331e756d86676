//! Byte-level reading for Chunky parsing
//!
//! Wraps a buffered byte source and tracks the absolute stream offset so
//! every failure can point at the byte where it happened.

use std::io::{BufRead, ErrorKind, Read};

use byteorder::{ByteOrder, LE};

use crate::{Error, Result};

/// Upper bound on speculative allocation for variable-length reads
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// Little-endian reader with offset tracking
pub struct ChunkReader<R> {
    inner: R,
    position: u64,
}

impl<R: BufRead> ChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_offset(inner, 0)
    }

    /// Start counting from `position`, for sources that begin mid-file
    pub fn with_offset(inner: R, position: u64) -> Self {
        Self { inner, position }
    }

    /// Absolute offset of the next byte to be read
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Check if the source is exhausted, without consuming anything
    pub fn is_at_end(&mut self) -> Result<bool> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read exactly N bytes
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read a 4-byte magic tag
    #[inline]
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        self.read_array()
    }

    /// Read a little-endian u32
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(LE::read_u32(&bytes))
    }

    /// Read exactly `len` raw bytes
    ///
    /// Allocation grows with the bytes actually present, so a corrupt length
    /// field fails as a truncation instead of a giant allocation.
    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        let offset = self.position;
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
        let read = (&mut self.inner).take(len).read_to_end(&mut buf)? as u64;
        self.position += read;

        if read < len {
            return Err(Error::TruncatedStream {
                offset,
                needed: len,
                available: read,
            });
        }

        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.position;
        let mut filled = 0;

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;

        if filled < buf.len() {
            return Err(Error::TruncatedStream {
                offset,
                needed: buf.len() as u64,
                available: filled as u64,
            });
        }

        Ok(())
    }
}
