//! Chunky container versions

use std::fmt;

use serde::Serialize;

/// Container format version, stored as two u32 values in the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Dawn of War era containers
    pub const V1_1: Version = Version::new(1, 1);

    /// Company of Heroes era containers, with extended chunk headers
    pub const V3_1: Version = Version::new(3, 1);

    /// Every version this crate knows the layout of
    pub const KNOWN: [Version; 2] = [Self::V1_1, Self::V3_1];

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(self)
    }

    /// Whether chunk headers carry the two extra u32 fields
    #[inline]
    pub fn has_extended_headers(&self) -> bool {
        *self == Self::V3_1
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}
