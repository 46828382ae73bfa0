//! Domain primitives with validated constructors.

use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for folder ids and listing entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `FolderId` is empty after trimming.
    InvalidFolderId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// A listing entry name is empty or contains a separator.
    InvalidEntryName {
        /// The rejected name.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidFolderId { .. } => ErrorCode::new("domain", "invalid_folder_id"),
            Self::InvalidEntryName { .. } => ErrorCode::new("domain", "invalid_entry_name"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFolderId { .. } => formatter.write_str("FolderId must be non-empty"),
            Self::InvalidEntryName { .. } => formatter
                .write_str("entry name must be a single non-empty path segment without '/'"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::InvalidFolderId { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidEntryName { input } => envelope.with_metadata("input", input),
        }
    }
}

/// Identifier for a synchronized folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(Box<str>);

impl FolderId {
    /// Parse a `FolderId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::InvalidFolderId {
                input_length: raw.len(),
            });
        }
        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FolderId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One entry of an already-fetched directory listing.
///
/// `path` is root-relative and slash-separated; entries are immutable once
/// handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Final path segment.
    pub name: Box<str>,
    /// Root-relative path, e.g. `Photos/Raw`.
    pub path: Box<str>,
    /// True for regular files, false for directories.
    pub is_file: bool,
}

impl FileEntry {
    /// Build an entry for `name` located under `prefix` (`None` or empty for the root).
    pub fn under(prefix: Option<&str>, name: &str, is_file: bool) -> Result<Self, PrimitiveError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(PrimitiveError::InvalidEntryName {
                input: name.to_owned(),
            });
        }
        let prefix = prefix.map(|prefix| prefix.trim_matches('/')).unwrap_or("");
        let path = if prefix.is_empty() {
            name.to_owned()
        } else {
            format!("{prefix}/{name}")
        };
        Ok(Self {
            name: name.into(),
            path: path.into_boxed_str(),
            is_file,
        })
    }
}
