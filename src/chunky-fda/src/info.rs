//! FDA `INFO` chunk: the sound's format description

use byteorder::{ReadBytesExt, LE};
use serde::Serialize;

use crate::{Error, Result};

/// Bytes taken by the seven u32 fields
pub const INFO_SIZE: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Info {
    pub channels: u32,
    /// Bits per sample
    pub sample_size: u32,
    pub block_bitrate: u32,
    pub sample_rate: u32,
    pub begin_loop: u32,
    pub end_loop: u32,
    pub start_offset: u32,
}

impl Info {
    /// Parse the INFO payload; bytes past the seven fields are ignored
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < INFO_SIZE {
            return Err(Error::InfoLayout {
                needed: INFO_SIZE,
                actual: payload.len(),
            });
        }

        let mut reader = payload;
        Ok(Self {
            channels: reader.read_u32::<LE>()?,
            sample_size: reader.read_u32::<LE>()?,
            block_bitrate: reader.read_u32::<LE>()?,
            sample_rate: reader.read_u32::<LE>()?,
            begin_loop: reader.read_u32::<LE>()?,
            end_loop: reader.read_u32::<LE>()?,
            start_offset: reader.read_u32::<LE>()?,
        })
    }
}
