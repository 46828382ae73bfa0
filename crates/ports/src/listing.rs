//! Directory listing boundary contract.

use crate::BoxFuture;
use ignore_tree_domain::{FileEntry, FolderId};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::fmt;

/// A validated listing scope inside a folder.
///
/// Rejects absolute paths and `..` traversal; an empty prefix is the folder
/// root and is represented by `ListingPrefix::root()`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ListingPrefix(Box<str>);

impl ListingPrefix {
    /// The folder root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Validate and normalize an untrusted prefix.
    pub fn parse(input: &str) -> Result<Self> {
        let replaced = input.trim().replace('\\', "/");
        if is_absolute_like(&replaced) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "listing prefix must be folder-relative",
            )
            .with_metadata("prefix", input));
        }
        let segments: Vec<&str> = replaced
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();
        if segments.contains(&"..") {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "listing prefix must not traverse upwards",
            )
            .with_metadata("prefix", input));
        }
        Ok(Self(segments.join("/").into_boxed_str()))
    }

    /// Borrow the normalized prefix (empty at the root).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the folder root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The prefix as an optional parent path for `FileEntry::under`.
    #[must_use]
    pub fn as_parent(&self) -> Option<&str> {
        (!self.is_root()).then_some(self.as_str())
    }
}

impl fmt::Display for ListingPrefix {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn is_absolute_like(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    matches!(path.as_bytes(), [drive, b':', ..] if drive.is_ascii_alphabetic())
}

/// One listing call: which folder, which subtree, how deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// Folder to list.
    pub folder: FolderId,
    /// Subtree to list; root when empty.
    pub prefix: ListingPrefix,
    /// Extra depth below `prefix`; 0 lists immediate children only.
    pub levels: u32,
}

impl ListingRequest {
    /// Immediate children of the folder root.
    #[must_use]
    pub fn new(folder: FolderId) -> Self {
        Self {
            folder,
            prefix: ListingPrefix::root(),
            levels: 0,
        }
    }

    /// Scope the request to `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: ListingPrefix) -> Self {
        self.prefix = prefix;
        self
    }

    /// Request `levels` extra levels below the prefix.
    #[must_use]
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }
}

/// Boundary contract for fetching folder listings.
///
/// Entries carry root-relative paths (`prefix/name`). Order is the source's
/// own; the tree renders in the order received.
pub trait ListingSourcePort: Send + Sync {
    /// Fetch the entries under `request.prefix`.
    fn list(
        &self,
        ctx: &RequestContext,
        request: ListingRequest,
    ) -> BoxFuture<'_, Result<Vec<FileEntry>>>;
}
