//! Folder, listing and pattern fixtures shared by tests.

use ignore_tree_ports::{FileEntry, FolderId};
use ignore_tree_shared::{ErrorEnvelope, Result};

/// Pattern text for the common two-rule scenario: `Photos` ignored, `Music` included.
pub const PHOTOS_MUSIC_PATTERNS: &str = "/Photos\n!/Music\n";

/// Parse a folder id.
pub fn folder(id: &str) -> Result<FolderId> {
    FolderId::parse(id).map_err(ErrorEnvelope::from)
}

/// Directory entries named `names` under `prefix`, in the given order.
pub fn dirs(prefix: Option<&str>, names: &[&str]) -> Result<Vec<FileEntry>> {
    names
        .iter()
        .map(|name| FileEntry::under(prefix, name, false).map_err(ErrorEnvelope::from))
        .collect()
}

/// A file entry under `prefix`.
pub fn file(prefix: Option<&str>, name: &str) -> Result<FileEntry> {
    FileEntry::under(prefix, name, true).map_err(ErrorEnvelope::from)
}

/// The folder root listing used across scenarios: `Backups`, `Music`, `Photos`.
pub fn root_listing() -> Result<Vec<FileEntry>> {
    dirs(None, &["Backups", "Music", "Photos"])
}
