//! Pattern store boundary contract.

use ignore_tree_domain::{FolderId, Pattern, PatternList, PatternSyntax};
use ignore_tree_shared::Result;

/// The single source of truth for a folder's ordered pattern list.
///
/// Reads return snapshots; edits go through `add_pattern`/`remove_pattern`
/// so persistence stays with the store.
pub trait PatternStorePort: Send + Sync {
    /// Syntax used to parse `add_pattern` text and render `text()`.
    fn syntax(&self) -> PatternSyntax;

    /// Snapshot of the folder's list (empty for unknown folders).
    fn patterns(&self, folder: &FolderId) -> Result<PatternList>;

    /// Parse one rule line and append it, returning the stamped pattern.
    ///
    /// Empty paths fail with `pattern:empty_path`; non-literal text fails with
    /// `pattern:unsupported_syntax`.
    fn add_pattern(&self, folder: &FolderId, text: &str) -> Result<Pattern>;

    /// Remove exactly `pattern`; `pattern:unknown_pattern` if absent.
    fn remove_pattern(&self, folder: &FolderId, pattern: &Pattern) -> Result<()>;

    /// Replace the folder's list with parsed `text`.
    fn load_text(&self, folder: &FolderId, text: &str) -> Result<()>;

    /// Render the folder's list as newline-delimited text.
    fn text(&self, folder: &FolderId) -> Result<String>;
}
