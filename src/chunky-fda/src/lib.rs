//! FDA audio projection for Relic Chunky files
//!
//! FDA files hold one sound as a Chunky tree:
//!
//! ```text
//! FOLD "FDA "
//! ├── DATA "INFO"   format description (7 × u32)
//! └── DATA "DATA"   u32 length + encoded audio bytes
//! ```
//!
//! Only the layout is interpreted; the audio bytes are kept as-is.

mod data;
mod info;

use std::io::BufRead;

use chunky::{find_data, find_folder, Chunky, ChunkyHeader, Expected, Projection};
use serde::Serialize;
use tracing::debug;

pub use data::Data;
pub use info::{Info, INFO_SIZE};

/// Folder wrapping the sound
pub const FDA_FOLDER: Expected = Expected::folder("FDA ");

/// Format description chunk
pub const INFO_CHUNK: Expected = Expected::data("INFO");

/// Audio payload chunk
pub const DATA_CHUNK: Expected = Expected::data("DATA");

/// Errors from FDA projection
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Chunky(#[from] chunky::Error),

    #[error("FDA INFO chunk too short: need {needed} bytes, got {actual}")]
    InfoLayout { needed: usize, actual: usize },

    #[error("FDA DATA chunk needs {needed} bytes but only {available} are present")]
    DataLayout { needed: u64, available: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A decoded FDA sound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fda {
    pub header: ChunkyHeader,
    pub info: Info,
    pub data: Data,
}

impl Projection for Fda {
    type Error = Error;

    fn project(chunky: &Chunky) -> Result<Self> {
        let folder = find_folder(&chunky.chunks, FDA_FOLDER.id)?;
        let info = Info::from_payload(find_data(&folder.children, INFO_CHUNK.id)?.payload())?;
        let data = Data::from_payload(find_data(&folder.children, DATA_CHUNK.id)?.payload())?;

        debug!(
            channels = info.channels,
            sample_rate = info.sample_rate,
            audio_bytes = data.audio.len(),
            "projected FDA"
        );

        Ok(Self {
            header: chunky.header,
            info,
            data,
        })
    }
}

impl Fda {
    /// Decode and project an FDA file
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        <Self as Projection>::read(reader)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }
}
