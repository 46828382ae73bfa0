//! # ignore-tree-app
//!
//! Use cases over the ignore-tree ports:
//!
//! - [`MatchIndex`] caches resolved records per folder and plans toggles.
//! - [`TreeSync`] keeps a rendered tree in step with listings.
//! - [`IgnoreBrowser`] binds both to user actions.
//!
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod browser;
pub mod match_index;
pub mod tree_sync;

pub use browser::IgnoreBrowser;
pub use match_index::{MatchIndex, SharedMatchIndex, lock_index};
pub use tree_sync::{RefreshOutcome, TreeSync, TreeSyncDeps, TreeSyncSettings, row_for};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignore_tree_domain::domain_crate_version;
    use ignore_tree_ports::ports_crate_version;
    use ignore_tree_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        assert!(!app_crate_version().is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }

    #[test]
    fn app_does_not_depend_on_adapters() {
        let manifest = include_str!("../Cargo.toml");
        let dependencies = manifest
            .split("[dev-dependencies]")
            .next()
            .unwrap_or_default();
        assert!(!dependencies.contains("ignore-tree-adapters"));
        assert!(!dependencies.contains("ignore-tree-testkit"));
    }
}
