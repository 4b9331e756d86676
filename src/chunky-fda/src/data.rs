//! FDA `DATA` chunk: length-prefixed encoded audio

use byteorder::{ReadBytesExt, LE};
use serde::Serialize;

use crate::{Error, Result};

/// Size of the length prefix
const LENGTH_SIZE: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Data {
    /// Encoded audio bytes; not decoded here
    #[serde(skip)]
    pub audio: Vec<u8>,
}

impl Data {
    /// Parse the DATA payload; bytes past the declared length are ignored
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let available = payload.len() as u64;
        if available < LENGTH_SIZE {
            return Err(Error::DataLayout {
                needed: LENGTH_SIZE,
                available,
            });
        }

        let mut reader = payload;
        let declared = u64::from(reader.read_u32::<LE>()?);
        if LENGTH_SIZE + declared > available {
            return Err(Error::DataLayout {
                needed: LENGTH_SIZE + declared,
                available,
            });
        }

        Ok(Self {
            audio: reader[..declared as usize].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty()
    }
}
