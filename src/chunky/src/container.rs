//! Chunky file container
//!
//! A file header (magic + version) followed by the top-level chunks.

use std::io::{BufRead, Write};

use byteorder::{WriteBytesExt, LE};
use serde::Serialize;
use tracing::debug;

use crate::reader::ChunkReader;
use crate::tree::{read_chunks, walk, Chunk, Walk};
use crate::{DecodeOptions, Error, Result, Version};

/// File magic: "Relic Chunky"
pub const CHUNKY_MAGIC: [u8; 12] = *b"Relic Chunky";

/// Bytes following the magic in every known file
pub const CHUNKY_TERMINATOR: [u8; 4] = *b"\r\n\x1a\0";

/// Container header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkyHeader {
    pub version: Version,
    /// Unknown fields present only in v3.1 files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<[u32; 3]>,
}

impl ChunkyHeader {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            extra: None,
        }
    }

    /// Parse the file header at the reader's cursor
    pub fn read<R: BufRead>(reader: &mut ChunkReader<R>, options: &DecodeOptions) -> Result<Self> {
        let found = reader.read_array::<16>()?;
        if found[..12] != CHUNKY_MAGIC || found[12..] != CHUNKY_TERMINATOR {
            return Err(Error::InvalidMagic { found });
        }

        let version = Version::new(reader.read_u32()?, reader.read_u32()?);
        if !version.is_known() && !options.allow_unknown_versions {
            return Err(Error::UnsupportedVersion(version));
        }

        let extra = if version == Version::V3_1 {
            Some([reader.read_u32()?, reader.read_u32()?, reader.read_u32()?])
        } else {
            None
        };

        Ok(Self { version, extra })
    }

    /// Encode the file header; missing v3.1 extra fields are written as zeros
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&CHUNKY_MAGIC)?;
        w.write_all(&CHUNKY_TERMINATOR)?;
        w.write_u32::<LE>(self.version.major)?;
        w.write_u32::<LE>(self.version.minor)?;
        if self.version == Version::V3_1 {
            for value in self.extra.unwrap_or_default() {
                w.write_u32::<LE>(value)?;
            }
        }
        Ok(())
    }
}

/// A decoded Chunky file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunky {
    pub header: ChunkyHeader,
    pub chunks: Vec<Chunk>,
}

impl Chunky {
    /// Decode a whole file with default options
    ///
    /// Pass `&mut reader` to keep using the source afterwards.
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        Self::read_with(reader, &DecodeOptions::default())
    }

    /// Decode a whole file
    pub fn read_with<R: BufRead>(reader: R, options: &DecodeOptions) -> Result<Self> {
        let mut reader = ChunkReader::new(reader);
        let header = ChunkyHeader::read(&mut reader, options)?;
        let chunks = read_chunks(&mut reader, header.version, options)?;

        debug!(
            version = %header.version,
            chunks = chunks.len(),
            bytes = reader.position(),
            "decoded chunky"
        );

        Ok(Self { header, chunks })
    }

    /// Decode from an in-memory buffer
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read(data)
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Depth-first walk over every chunk in the file
    pub fn walk(&self) -> Walk<'_> {
        walk(&self.chunks)
    }

    /// Encode the whole file
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        crate::writer::write_chunky(w, self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}
