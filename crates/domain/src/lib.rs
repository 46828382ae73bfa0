//! # ignore-tree-domain
//!
//! Pure model of folder ignore patterns:
//!
//! - **Primitives** - `FolderId`, `FileEntry`
//! - **Patterns** - `Pattern`, `PatternPath`, `PatternSequence`, `PatternList`
//! - **Matcher** - `resolve`, `MatchRecord`
//! - **Toggle** - `plan_toggle`, `ToggleEdit`
//! - **Text** - `PatternSyntax` (newline-delimited pattern files)
//! - **State** - `TreeState`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use ignore_tree_shared::shared_crate_version;

pub mod matcher;
pub mod pattern;
pub mod pattern_text;
pub mod primitives;
pub mod states;
pub mod toggle;

pub use matcher::{MatchRecord, governing_pattern, resolve};
pub use pattern::{Pattern, PatternError, PatternLine, PatternList, PatternPath, PatternSequence};
pub use pattern_text::PatternSyntax;
pub use primitives::{FileEntry, FolderId, PrimitiveError};
pub use states::TreeState;
pub use toggle::{ToggleEdit, plan_toggle};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
