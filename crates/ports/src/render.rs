//! Tree rendering boundary contract.

use ignore_tree_domain::FolderId;
use serde_json::{Value, json};

/// One visual row, keyed by the entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Root-relative path; unique within a rendered tree.
    pub key: Box<str>,
    /// Display name (last path segment).
    pub title: Box<str>,
    /// Directories render as expandable folders.
    pub is_folder: bool,
    /// Checkbox state. Checked means included, so ignored rows are unchecked.
    pub selected: bool,
}

impl TreeRow {
    /// JSON node shape used by tree widgets.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "key": self.key.as_ref(),
            "title": self.title.as_ref(),
            "folder": self.is_folder,
            "lazy": self.is_folder,
            "selected": self.selected,
        })
    }
}

/// Boundary contract for the visual tree.
///
/// Calls are synchronous; any layout pass the widget needs is its own concern.
pub trait TreeRenderPort: Send + Sync {
    /// Remove every rendered row.
    fn clear(&self);

    /// Replace the rendered rows with `rows` for `folder`.
    fn render(&self, folder: &FolderId, rows: &[TreeRow]);

    /// Update one row's checkbox in place.
    fn set_selected(&self, folder: &FolderId, key: &str, selected: bool);
}
