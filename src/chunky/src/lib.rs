//! Relic Chunky container decoder
//!
//! Chunky files package game assets (audio, models, textures) as a tree of
//! self-describing chunks. Every chunk is either a folder holding more chunks
//! or a data chunk holding an opaque payload.
//!
//! # Format Overview
//!
//! ## File header
//!
//! - Bytes 0-11: "Relic Chunky" magic
//! - Bytes 12-15: `\r\n\x1a\0` terminator
//! - Bytes 16-19: Major version
//! - Bytes 20-23: Minor version
//! - v3.1 only: three more u32 values of unknown meaning
//!
//! ## Chunk header
//!
//! - Bytes 0-3: Type tag (`FOLD` or `DATA`)
//! - Bytes 4-7: Chunk id (ASCII, leading NUL padding)
//! - Bytes 8-11: Chunk version
//! - Bytes 12-15: Payload size (header excluded)
//! - Bytes 16-19: Name length
//! - v3.1 only: two more u32 values of unknown meaning
//! - Remaining: Name (ASCII, trailing NUL padding)
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = BufReader::new(File::open("sound.fda")?);
//! let chunky = chunky::Chunky::read(file)?;
//!
//! for chunk in chunky.walk() {
//!     println!("{} {:?} ({} bytes)", chunk.kind(), chunk.header().id, chunk.header().size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod header;
pub mod options;
pub mod reader;
pub mod schema;
pub mod tree;
pub mod version;
pub mod writer;

// Re-export main types
pub use container::{Chunky, ChunkyHeader, CHUNKY_MAGIC, CHUNKY_TERMINATOR};
pub use header::{ChunkHeader, ChunkType, BASE_HEADER_SIZE, EXTRA_FIELDS_SIZE};
pub use options::DecodeOptions;
pub use reader::ChunkReader;
pub use schema::{find_data, find_folder, find_one, Expected, Mismatch, Projection};
pub use tree::{read_children, read_chunks, walk, Chunk, DataChunk, FolderChunk, Walk};
pub use version::Version;
pub use writer::{write_chunks, write_chunky};

/// Errors from Chunky decoding and projection
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Truncated stream @{offset} ~ 0x{offset:x}: need {needed} bytes, got {available}")]
    TruncatedStream {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Invalid chunk type '{}' @{offset} ~ 0x{offset:x}", .tag.escape_ascii())]
    InvalidChunkType { tag: [u8; 4], offset: u64 },

    #[error("Invalid chunk id '{}' @{offset} ~ 0x{offset:x}", .id.escape_ascii())]
    InvalidChunkId { id: [u8; 4], offset: u64 },

    #[error("Invalid chunk name '{}' @{offset} ~ 0x{offset:x}", .name.escape_ascii())]
    InvalidChunkName { name: Vec<u8>, offset: u64 },

    #[error("Chunk @{offset} ~ 0x{offset:x} needs {needed} bytes but only {remaining} remain in its parent")]
    ChunkBounds {
        offset: u64,
        needed: u64,
        remaining: u64,
    },

    #[error("Folder @{offset} ~ 0x{offset:x} nests {depth} levels deep")]
    NestingTooDeep { offset: u64, depth: usize },

    #[error("Invalid Chunky magic: got '{}'", .found.escape_ascii())]
    InvalidMagic { found: [u8; 16] },

    #[error("Unsupported Chunky version {0}")]
    UnsupportedVersion(Version),

    #[error("Schema mismatch for {expected}: {problem}")]
    SchemaMismatch {
        expected: Expected,
        problem: Mismatch,
    },

    #[error("Cannot encode chunk '{id}': {reason}")]
    Encode { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check if data starts with the Chunky file magic
pub fn is_chunky(data: &[u8]) -> bool {
    data.len() >= 16 && data[..12] == CHUNKY_MAGIC && data[12..16] == CHUNKY_TERMINATOR
}

/// Byte builders shared by the unit tests
#[cfg(test)]
pub(crate) mod test_bytes {
    use byteorder::{WriteBytesExt, LE};

    /// Encode one chunk header under the base (non-v3.1) layout
    pub fn header(tag: &[u8; 4], id: &[u8; 4], version: u32, size: u32, name: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + name.len());
        out.extend_from_slice(tag);
        out.extend_from_slice(id);
        out.write_u32::<LE>(version).unwrap();
        out.write_u32::<LE>(size).unwrap();
        out.write_u32::<LE>(name.len() as u32).unwrap();
        out.extend_from_slice(name);
        out
    }

    /// Encode one chunk header under the v3.1 layout
    pub fn header_v3_1(
        tag: &[u8; 4],
        id: &[u8; 4],
        size: u32,
        extra: [u32; 2],
        name: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::with_capacity(28 + name.len());
        out.extend_from_slice(tag);
        out.extend_from_slice(id);
        out.write_u32::<LE>(1).unwrap();
        out.write_u32::<LE>(size).unwrap();
        out.write_u32::<LE>(name.len() as u32).unwrap();
        out.write_u32::<LE>(extra[0]).unwrap();
        out.write_u32::<LE>(extra[1]).unwrap();
        out.extend_from_slice(name);
        out
    }

    /// Encode a complete data chunk
    pub fn data(id: &[u8; 4], name: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = header(b"DATA", id, 1, payload.len() as u32, name);
        out.extend_from_slice(payload);
        out
    }

    /// Encode a complete folder chunk around already-encoded children
    pub fn folder(id: &[u8; 4], name: &[u8], children: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = children.concat();
        let mut out = header(b"FOLD", id, 1, body.len() as u32, name);
        out.extend_from_slice(&body);
        out
    }

    /// Encode a file header
    pub fn file_header(major: u32, minor: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        out.extend_from_slice(b"Relic Chunky\r\n\x1a\0");
        out.write_u32::<LE>(major).unwrap();
        out.write_u32::<LE>(minor).unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_chunky() {
        assert!(is_chunky(b"Relic Chunky\r\n\x1a\0\x01\0\0\0"));
        assert!(!is_chunky(b"Relic Chunky\r\n"));
        assert!(!is_chunky(b"Relic Chonky\r\n\x1a\0"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidChunkType {
            tag: *b"XXXX",
            offset: 32,
        };
        assert_eq!(err.to_string(), "Invalid chunk type 'XXXX' @32 ~ 0x20");

        let err = Error::InvalidChunkName {
            name: vec![b'a', 0xff],
            offset: 16,
        };
        assert!(err.to_string().contains("a\\xff"));

        let err = Error::TruncatedStream {
            offset: 0,
            needed: 20,
            available: 3,
        };
        assert!(err.to_string().contains("need 20 bytes, got 3"));

        let err = Error::ChunkBounds {
            offset: 24,
            needed: 32,
            remaining: 10,
        };
        assert!(err.to_string().contains("only 10 remain"));

        let err = Error::UnsupportedVersion(Version::new(2, 0));
        assert_eq!(err.to_string(), "Unsupported Chunky version v2.0");

        let err = Error::SchemaMismatch {
            expected: Expected::data("INFO"),
            problem: Mismatch::Missing,
        };
        assert_eq!(err.to_string(), "Schema mismatch for DATA 'INFO': chunk is missing");

        let err = Error::Encode {
            id: "TOOLONG".into(),
            reason: "id is not at most 4 ASCII bytes".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot encode chunk 'TOOLONG': id is not at most 4 ASCII bytes"
        );
    }

    #[test]
    fn test_error_debug() {
        let err = Error::InvalidChunkType {
            tag: *b"XXXX",
            offset: 0,
        };
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidChunkType"));
    }
}
