//! Chunk header parsing
//!
//! Every chunk starts with a 20-byte base record followed, under v3.1, by two
//! extra u32 values, and then by a variable-length name.

use std::fmt;
use std::io::{self, BufRead, Read, Write};

use byteorder::{WriteBytesExt, LE};
use serde::Serialize;
use tracing::trace;

use crate::reader::ChunkReader;
use crate::{Error, Result, Version};

/// Size of the fixed part of every chunk header
pub const BASE_HEADER_SIZE: u64 = 20;

/// Size of the extra fields carried by v3.1 chunk headers
pub const EXTRA_FIELDS_SIZE: u64 = 8;

/// Magic tag for folder chunks
pub const FOLDER_MAGIC: [u8; 4] = *b"FOLD";

/// Magic tag for data chunks
pub const DATA_MAGIC: [u8; 4] = *b"DATA";

/// Chunk kind, from the 4-byte type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChunkType {
    /// `FOLD` - contains child chunks
    #[serde(rename = "FOLD")]
    Folder,
    /// `DATA` - contains an opaque payload
    #[serde(rename = "DATA")]
    Data,
}

impl ChunkType {
    pub fn from_magic(tag: &[u8; 4]) -> Option<Self> {
        match tag {
            b"FOLD" => Some(Self::Folder),
            b"DATA" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            Self::Folder => &FOLDER_MAGIC,
            Self::Data => &DATA_MAGIC,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Folder => "FOLD",
            Self::Data => "DATA",
        })
    }
}

/// Decoded chunk header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkHeader {
    #[serde(rename = "type")]
    pub kind: ChunkType,
    /// Chunk id with leading NUL padding removed (e.g. "FDA ", "INFO")
    pub id: String,
    pub version: u32,
    /// Payload length in bytes, header excluded
    pub size: u32,
    /// Name with trailing NUL padding removed
    pub name: String,
    /// Declared length of the name record, padding included
    pub name_size: u32,
    /// Unknown fields present only in v3.1 containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<[u32; 2]>,
}

impl ChunkHeader {
    /// Parse a chunk header at the reader's cursor
    ///
    /// Leaves the cursor at the first payload byte. The declared size is not
    /// checked against anything here.
    pub fn read<R: BufRead>(reader: &mut ChunkReader<R>, chunky_version: Version) -> Result<Self> {
        Self::read_within(reader, chunky_version, None)
    }

    /// Parse a chunk header that must fit in `limit` bytes
    ///
    /// Nothing past `limit` is read: the fixed record is checked before it is
    /// read and the name is checked once its length is known. Either overrun
    /// fails with [`Error::ChunkBounds`].
    pub fn read_within<R: BufRead>(
        reader: &mut ChunkReader<R>,
        chunky_version: Version,
        limit: Option<u64>,
    ) -> Result<Self> {
        let offset = reader.position();
        let check = |needed: u64| match limit {
            Some(remaining) if needed > remaining => Err(Error::ChunkBounds {
                offset,
                needed,
                remaining,
            }),
            _ => Ok(()),
        };

        let record_len = fixed_len(chunky_version);
        check(record_len)?;

        let tag = reader.read_tag()?;
        let raw_id = reader.read_tag()?;
        let version = reader.read_u32()?;
        let size = reader.read_u32()?;
        let name_size = reader.read_u32()?;

        let kind = ChunkType::from_magic(&tag).ok_or(Error::InvalidChunkType { tag, offset })?;

        let extra = if chunky_version.has_extended_headers() {
            Some([reader.read_u32()?, reader.read_u32()?])
        } else {
            None
        };

        let id = decode_id(&raw_id).ok_or(Error::InvalidChunkId { id: raw_id, offset })?;

        check(record_len + u64::from(name_size))?;
        let raw_name = reader.read_bytes(u64::from(name_size))?;
        let name = match decode_name(&raw_name) {
            Some(name) => name,
            None => return Err(Error::InvalidChunkName { name: raw_name, offset }),
        };

        trace!(offset, %kind, id = %id, size, name = %name, "chunk header");

        Ok(Self {
            kind,
            id,
            version,
            size,
            name,
            name_size,
            extra,
        })
    }

    /// Encoded header length under the given container version
    #[inline]
    pub fn encoded_len(&self, chunky_version: Version) -> u64 {
        let name_len = u64::from(self.name_size).max(self.name.len() as u64);
        fixed_len(chunky_version) + name_len
    }

    /// Encode this header
    ///
    /// The id gets its leading NUL padding back and the name is padded with
    /// NULs up to `name_size`. Missing v3.1 extra fields are written as zeros.
    pub fn write<W: Write>(&self, w: &mut W, chunky_version: Version) -> Result<()> {
        let id = self.id.as_bytes();
        if id.len() > 4 || !id.is_ascii() {
            return Err(self.encode_error("id is not at most 4 ASCII bytes"));
        }
        if !self.name.is_ascii() {
            return Err(self.encode_error("name is not ASCII"));
        }
        let name_size = padded_name_size(self.name.len(), self.name_size)
            .ok_or_else(|| self.encode_error("name is longer than u32::MAX bytes"))?;

        let mut raw_id = [0u8; 4];
        raw_id[4 - id.len()..].copy_from_slice(id);

        w.write_all(self.kind.magic())?;
        w.write_all(&raw_id)?;
        w.write_u32::<LE>(self.version)?;
        w.write_u32::<LE>(self.size)?;
        w.write_u32::<LE>(name_size)?;
        if chunky_version.has_extended_headers() {
            let [a, b] = self.extra.unwrap_or_default();
            w.write_u32::<LE>(a)?;
            w.write_u32::<LE>(b)?;
        }
        w.write_all(self.name.as_bytes())?;

        let padding = u64::from(name_size) - self.name.len() as u64;
        io::copy(&mut io::repeat(0).take(padding), w)?;
        Ok(())
    }

    pub(crate) fn encode_error(&self, reason: impl Into<String>) -> Error {
        Error::Encode {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }
}

/// Header length before the name
fn fixed_len(chunky_version: Version) -> u64 {
    if chunky_version.has_extended_headers() {
        BASE_HEADER_SIZE + EXTRA_FIELDS_SIZE
    } else {
        BASE_HEADER_SIZE
    }
}

/// Name record length to write: the declared size, grown to fit the name
fn padded_name_size(name_len: usize, declared: u32) -> Option<u32> {
    u32::try_from(name_len).ok().map(|len| len.max(declared))
}

/// Ids keep trailing bytes; only leading NUL padding goes
fn decode_id(raw: &[u8; 4]) -> Option<String> {
    if !raw.is_ascii() {
        return None;
    }
    let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
    std::str::from_utf8(&raw[start..]).ok().map(str::to_string)
}

/// Names keep leading bytes; only trailing NUL padding goes
fn decode_name(raw: &[u8]) -> Option<String> {
    if !raw.is_ascii() {
        return None;
    }
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    std::str::from_utf8(&raw[..end]).ok().map(str::to_string)
}
