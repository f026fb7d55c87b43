use std::fmt;

use serde::{Deserialize, Serialize};

/// Save-file variant the image was written by.
///
/// Only the English Refine release has a usable checksum algorithm; every
/// other variant goes through the degraded constant path in
/// [`crate::checksum`]. Detection is supplied by the caller at load time
/// and fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileVersion {
    EnglishRefine,
    JapaneseRefine,
}

impl FileVersion {
    pub const ENGLISH_REFINE_CHECKSUM_OFFSET: usize = 0x1B4C;
    pub const JAPANESE_REFINE_CHECKSUM_OFFSET: usize = 0x1114;

    /// Offset of the 4-byte little-endian checksum field for this variant.
    pub fn checksum_offset(&self) -> usize {
        match self {
            Self::EnglishRefine => Self::ENGLISH_REFINE_CHECKSUM_OFFSET,
            Self::JapaneseRefine => Self::JAPANESE_REFINE_CHECKSUM_OFFSET,
        }
    }

    pub fn has_full_checksum(&self) -> bool {
        matches!(self, Self::EnglishRefine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnglishRefine => "English Refine",
            Self::JapaneseRefine => "Japanese Refine",
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
