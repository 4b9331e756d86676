//! Chunk tree building
//!
//! Folders are decoded recursively with a byte budget equal to their declared
//! size; the root is bounded only by the end of the stream.

use std::io::BufRead;

use serde::Serialize;
use tracing::trace;

use crate::header::{ChunkHeader, ChunkType};
use crate::reader::ChunkReader;
use crate::{DecodeOptions, Error, Result, Version};

/// One node of a decoded chunk tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Chunk {
    Folder(FolderChunk),
    Data(DataChunk),
}

/// `FOLD` chunk and its children, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderChunk {
    pub header: ChunkHeader,
    pub children: Vec<Chunk>,
}

/// `DATA` chunk and its raw payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataChunk {
    pub header: ChunkHeader,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl Chunk {
    #[inline]
    pub fn header(&self) -> &ChunkHeader {
        match self {
            Self::Folder(folder) => &folder.header,
            Self::Data(data) => &data.header,
        }
    }

    #[inline]
    pub fn kind(&self) -> ChunkType {
        self.header().kind
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.header().id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn as_folder(&self) -> Option<&FolderChunk> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataChunk> {
        match self {
            Self::Data(data) => Some(data),
            Self::Folder(_) => None,
        }
    }

    /// Header plus declared payload length
    pub fn encoded_len(&self, chunky_version: Version) -> u64 {
        let header = self.header();
        header.encoded_len(chunky_version) + u64::from(header.size)
    }

    /// Depth-first, pre-order walk of this chunk and everything below it
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self],
        }
    }
}

impl FolderChunk {
    pub fn children(&self) -> &[Chunk] {
        &self.children
    }
}

impl DataChunk {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Pre-order iterator over a chunk forest
pub struct Walk<'a> {
    stack: Vec<&'a Chunk>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.stack.pop()?;
        if let Chunk::Folder(folder) = chunk {
            self.stack.extend(folder.children.iter().rev());
        }
        Some(chunk)
    }
}

/// Walk every chunk in `chunks`, descending into folders
pub fn walk(chunks: &[Chunk]) -> Walk<'_> {
    Walk {
        stack: chunks.iter().rev().collect(),
    }
}

/// How many bytes a chunk sequence may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    /// Root level: stop at end of stream
    UntilEnd,
    /// Inside a folder: stop after exactly this many bytes
    Bytes(u64),
}

/// Decode chunks until the stream ends
pub fn read_chunks<R: BufRead>(
    reader: &mut ChunkReader<R>,
    chunky_version: Version,
    options: &DecodeOptions,
) -> Result<Vec<Chunk>> {
    read_sequence(reader, chunky_version, Budget::UntilEnd, 0, options)
}

/// Decode the children of a folder whose payload is `size` bytes long
///
/// `depth` is the nesting level of the children (1 for children of a root
/// folder).
pub fn read_children<R: BufRead>(
    reader: &mut ChunkReader<R>,
    chunky_version: Version,
    size: u32,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<Chunk>> {
    read_sequence(
        reader,
        chunky_version,
        Budget::Bytes(u64::from(size)),
        depth,
        options,
    )
}

fn read_sequence<R: BufRead>(
    reader: &mut ChunkReader<R>,
    chunky_version: Version,
    budget: Budget,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut remaining = budget;

    loop {
        match remaining {
            Budget::Bytes(0) => break,
            Budget::UntilEnd if reader.is_at_end()? => break,
            _ => {}
        }

        let (chunk, consumed) = read_chunk(reader, chunky_version, remaining, depth, options)?;
        chunks.push(chunk);

        if let Budget::Bytes(left) = remaining {
            remaining = Budget::Bytes(left - consumed);
        }
    }

    Ok(chunks)
}

/// Decode one chunk, returning it with the number of bytes it occupied
fn read_chunk<R: BufRead>(
    reader: &mut ChunkReader<R>,
    chunky_version: Version,
    budget: Budget,
    depth: usize,
    options: &DecodeOptions,
) -> Result<(Chunk, u64)> {
    let offset = reader.position();
    let limit = match budget {
        Budget::UntilEnd => None,
        Budget::Bytes(remaining) => Some(remaining),
    };
    let header = ChunkHeader::read_within(reader, chunky_version, limit)?;
    let header_len = reader.position() - offset;
    let needed = header_len + u64::from(header.size);

    if let Some(remaining) = limit {
        if needed > remaining {
            return Err(Error::ChunkBounds {
                offset,
                needed,
                remaining,
            });
        }
    }

    let chunk = match header.kind {
        ChunkType::Folder => {
            let child_depth = depth + 1;
            if child_depth > options.max_depth {
                return Err(Error::NestingTooDeep {
                    offset,
                    depth: child_depth,
                });
            }
            let children =
                read_children(reader, chunky_version, header.size, child_depth, options)?;
            Chunk::Folder(FolderChunk { header, children })
        }
        ChunkType::Data => {
            let payload = reader.read_bytes(u64::from(header.size))?;
            Chunk::Data(DataChunk { header, payload })
        }
    };

    debug_assert_eq!(reader.position() - offset, needed);
    trace!(offset, depth, kind = %chunk.kind(), id = chunk.id(), needed, "chunk");

    Ok((chunk, needed))
}
