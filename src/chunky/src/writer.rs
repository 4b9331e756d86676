//! Chunky encoding
//!
//! Sizes are recomputed while writing: a data chunk declares its payload
//! length and a folder declares the encoded length of its children, so the
//! output always satisfies the folder size invariant.

use std::io::Write;

use crate::header::ChunkHeader;
use crate::tree::Chunk;
use crate::{Chunky, Result, Version};

/// Encode a whole file: header, then every top-level chunk
pub fn write_chunky<W: Write>(w: &mut W, chunky: &Chunky) -> Result<()> {
    chunky.header.write(w)?;
    write_chunks(w, &chunky.chunks, chunky.header.version)
}

/// Encode a chunk sequence under the given container version
pub fn write_chunks<W: Write>(w: &mut W, chunks: &[Chunk], chunky_version: Version) -> Result<()> {
    let mut lens = Vec::new();
    for chunk in chunks {
        collect_body_lens(chunk, chunky_version, &mut lens);
    }

    let mut next = 0;
    for chunk in chunks {
        write_chunk(w, chunk, chunky_version, &lens, &mut next)?;
    }
    Ok(())
}

/// Payload length a chunk will be written with
pub fn body_len(chunk: &Chunk, chunky_version: Version) -> u64 {
    collect_body_lens(chunk, chunky_version, &mut Vec::new())
}

/// Record the body length of `chunk` and every chunk below it, in pre-order
///
/// Each chunk is visited once; folders sum the lengths their children return.
fn collect_body_lens(chunk: &Chunk, chunky_version: Version, lens: &mut Vec<u64>) -> u64 {
    let slot = lens.len();
    lens.push(0);

    let len = match chunk {
        Chunk::Data(data) => data.payload.len() as u64,
        Chunk::Folder(folder) => folder
            .children
            .iter()
            .map(|child| {
                child.header().encoded_len(chunky_version)
                    + collect_body_lens(child, chunky_version, lens)
            })
            .sum(),
    };

    lens[slot] = len;
    len
}

/// Write `chunk` using the pre-order lengths starting at `lens[*next]`
fn write_chunk<W: Write>(
    w: &mut W,
    chunk: &Chunk,
    chunky_version: Version,
    lens: &[u64],
    next: &mut usize,
) -> Result<()> {
    let len = lens[*next];
    *next += 1;

    let size = u32::try_from(len).map_err(|_| {
        chunk
            .header()
            .encode_error(format!("body of {len} bytes exceeds u32::MAX"))
    })?;

    let header = ChunkHeader {
        size,
        ..chunk.header().clone()
    };
    header.write(w, chunky_version)?;

    match chunk {
        Chunk::Data(data) => w.write_all(&data.payload)?,
        Chunk::Folder(folder) => {
            for child in &folder.children {
                write_chunk(w, child, chunky_version, lens, next)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bytes;
    use crate::{ChunkType, DataChunk, FolderChunk};

    fn data_chunk(id: &str, payload: &[u8]) -> Chunk {
        Chunk::Data(DataChunk {
            header: ChunkHeader {
                kind: ChunkType::Data,
                id: id.to_string(),
                version: 1,
                size: 0,
                name: String::new(),
                name_size: 0,
                extra: None,
            },
            payload: payload.to_vec(),
        })
    }

    #[test]
    fn test_write_matches_hand_encoded() {
        let expected = test_bytes::folder(
            b"ROOT",
            b"",
            &[test_bytes::data(b"AAAA", b"", b"abc"), test_bytes::data(b"BBBB", b"", b"")],
        );

        let folder = Chunk::Folder(FolderChunk {
            header: ChunkHeader {
                kind: ChunkType::Folder,
                id: "ROOT".into(),
                version: 1,
                size: 999,
                name: String::new(),
                name_size: 0,
                extra: None,
            },
            children: vec![data_chunk("AAAA", b"abc"), data_chunk("BBBB", b"")],
        });

        let mut out = Vec::new();
        write_chunks(&mut out, &[folder], Version::V1_1).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_body_len_counts_v3_1_headers() {
        let folder = Chunk::Folder(FolderChunk {
            header: ChunkHeader {
                kind: ChunkType::Folder,
                ..data_chunk("F", b"").header().clone()
            },
            children: vec![data_chunk("AAAA", b"12")],
        });
        assert_eq!(body_len(&folder, Version::V1_1), 22);
        assert_eq!(body_len(&folder, Version::V3_1), 30);
    }

    #[test]
    fn test_body_lens_are_pre_order() {
        let inner = Chunk::Folder(FolderChunk {
            header: ChunkHeader {
                kind: ChunkType::Folder,
                ..data_chunk("INNR", b"").header().clone()
            },
            children: vec![data_chunk("AAAA", b"123"), data_chunk("BBBB", b"4")],
        });
        let outer = Chunk::Folder(FolderChunk {
            header: ChunkHeader {
                kind: ChunkType::Folder,
                ..data_chunk("OUTR", b"").header().clone()
            },
            children: vec![inner, data_chunk("CCCC", b"")],
        });

        let mut lens = Vec::new();
        let total = collect_body_lens(&outer, Version::V1_1, &mut lens);

        // INNR body: 23 + 21; OUTR body: 20 + 44 + 20
        assert_eq!(lens, [84, 44, 3, 1, 0]);
        assert_eq!(total, 84);
        assert_eq!(body_len(&outer, Version::V1_1), 84);
    }

    #[test]
    fn test_write_nested_matches_hand_encoded() {
        let expected = test_bytes::folder(
            b"OUTR",
            b"",
            &[
                test_bytes::folder(
                    b"INNR",
                    b"",
                    &[test_bytes::data(b"AAAA", b"", b"123"), test_bytes::data(b"BBBB", b"", b"4")],
                ),
                test_bytes::data(b"CCCC", b"", b""),
            ],
        );
        let decoded = crate::read_chunks(
            &mut crate::ChunkReader::new(&expected[..]),
            Version::V1_1,
            &crate::DecodeOptions::default(),
        )
        .unwrap();

        let mut out = Vec::new();
        write_chunks(&mut out, &decoded, Version::V1_1).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_bad_id_is_an_encode_error() {
        let mut out = Vec::new();
        let err = write_chunks(&mut out, &[data_chunk("TOOLONG", b"")], Version::V1_1).unwrap_err();
        assert!(matches!(err, crate::Error::Encode { ref id, .. } if id == "TOOLONG"));
    }

    #[test]
    fn test_round_trip_decoded_file() {
        let mut data = test_bytes::file_header(1, 1);
        data.extend(test_bytes::folder(
            b"\0FDA",
            b"name\0\0",
            &[
                test_bytes::data(b"INFO", b"info\0", &[1, 2, 3]),
                test_bytes::folder(b"EMPT", b"", &[]),
            ],
        ));

        let decoded = Chunky::from_bytes(&data).unwrap();
        let encoded = decoded.to_bytes().unwrap();
        assert_eq!(encoded, data);
        assert_eq!(Chunky::from_bytes(&encoded).unwrap(), decoded);
    }
}
