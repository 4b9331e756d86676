//! Decode configuration

/// Configuration for container decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum folder nesting; a folder at the root is depth 1
    pub max_depth: usize,
    /// Decode containers whose version is not in [`crate::Version::KNOWN`]
    pub allow_unknown_versions: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            allow_unknown_versions: false,
        }
    }
}

impl DecodeOptions {
    /// Options for inspecting files from unreleased or modded builds
    pub fn permissive() -> Self {
        Self {
            allow_unknown_versions: true,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_unknown_versions(mut self, allow: bool) -> Self {
        self.allow_unknown_versions = allow;
        self
    }
}
