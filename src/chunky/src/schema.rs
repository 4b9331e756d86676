//! Typed projection support
//!
//! Asset formats built on Chunky expect a fixed arrangement of chunks. This
//! module finds those chunks by id and kind and reports anything missing,
//! duplicated, or of the wrong kind as [`Error::SchemaMismatch`].

use std::fmt;
use std::io::BufRead;

use crate::header::ChunkType;
use crate::tree::{walk, Chunk, DataChunk, FolderChunk};
use crate::{Chunky, DecodeOptions, Error, Result};

/// One chunk a schema requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub kind: ChunkType,
    pub id: &'static str,
}

impl Expected {
    pub const fn data(id: &'static str) -> Self {
        Self {
            kind: ChunkType::Data,
            id,
        }
    }

    pub const fn folder(id: &'static str) -> Self {
        Self {
            kind: ChunkType::Folder,
            id,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

/// What was wrong with an expected chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Missing,
    Duplicated { count: usize },
    WrongKind { found: ChunkType },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("chunk is missing"),
            Self::Duplicated { count } => write!(f, "found {count} chunks, expected one"),
            Self::WrongKind { found } => write!(f, "found a {found} chunk"),
        }
    }
}

/// A strongly-typed view of a decoded Chunky file
///
/// Projection reads the generic tree and never modifies it; a failed
/// projection leaves the tree usable.
pub trait Projection: Sized {
    type Error: From<Error>;

    fn project(chunky: &Chunky) -> std::result::Result<Self, Self::Error>;

    /// Decode a file and project it in one step
    fn read<R: BufRead>(reader: R) -> std::result::Result<Self, Self::Error> {
        Self::read_with(reader, &DecodeOptions::default())
    }

    /// [`Projection::read`] with explicit decode options
    fn read_with<R: BufRead>(
        reader: R,
        options: &DecodeOptions,
    ) -> std::result::Result<Self, Self::Error> {
        let chunky = Chunky::read_with(reader, options)?;
        Self::project(&chunky)
    }
}

/// Find the single chunk matching `expected` anywhere below `chunks`
pub fn find_one(chunks: &[Chunk], expected: Expected) -> Result<&Chunk> {
    let mismatch = |problem| Error::SchemaMismatch { expected, problem };

    let mut matches = walk(chunks).filter(|chunk| chunk.id() == expected.id);
    let first = matches.next().ok_or_else(|| mismatch(Mismatch::Missing))?;

    let others = matches.count();
    if others > 0 {
        return Err(mismatch(Mismatch::Duplicated { count: others + 1 }));
    }

    if first.kind() != expected.kind {
        return Err(mismatch(Mismatch::WrongKind {
            found: first.kind(),
        }));
    }

    Ok(first)
}

/// Find the single data chunk with this id
pub fn find_data<'a>(chunks: &'a [Chunk], id: &'static str) -> Result<&'a DataChunk> {
    let expected = Expected::data(id);
    find_one(chunks, expected)?
        .as_data()
        .ok_or(Error::SchemaMismatch {
            expected,
            problem: Mismatch::WrongKind {
                found: ChunkType::Folder,
            },
        })
}

/// Find the single folder chunk with this id
pub fn find_folder<'a>(chunks: &'a [Chunk], id: &'static str) -> Result<&'a FolderChunk> {
    let expected = Expected::folder(id);
    find_one(chunks, expected)?
        .as_folder()
        .ok_or(Error::SchemaMismatch {
            expected,
            problem: Mismatch::WrongKind {
                found: ChunkType::Data,
            },
        })
}
