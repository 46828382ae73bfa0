//! Tree lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of the rendered tree for one folder.
///
/// `refresh` moves any state to `Loading`; a resolved listing moves it to
/// `Rendered`. Rendering another folder sends the previous one back to
/// `Unloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TreeState {
    /// Nothing requested or rendered.
    #[default]
    Unloaded,
    /// A listing request is in flight.
    Loading,
    /// Rows are on screen.
    Rendered,
}

impl TreeState {
    /// True when `update` has rows to touch.
    #[must_use]
    pub const fn is_rendered(self) -> bool {
        matches!(self, Self::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_with_status_tag() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(TreeState::Loading)?;
        assert_eq!(value, serde_json::json!({ "status": "loading" }));
        assert_eq!(TreeState::default(), TreeState::Unloaded);
        assert!(TreeState::Rendered.is_rendered());
        Ok(())
    }
}
