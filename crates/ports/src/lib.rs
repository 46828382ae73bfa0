//! # ignore-tree-ports
//!
//! Boundary traits between the ignore-tree use cases and their collaborators:
//! the listing source, the pattern store, the tree renderer, logging and
//! telemetry. Depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by async port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod listing;
pub mod logger;
pub mod pattern_store;
pub mod render;
pub mod telemetry;

pub use listing::*;
pub use logger::*;
pub use pattern_store::*;
pub use render::*;
pub use telemetry::*;

// Domain types used in port signatures, so adapters can implement ports
// without a direct `ignore-tree-domain` dependency.
pub use ignore_tree_domain::{FileEntry, FolderId, Pattern, PatternList, PatternSyntax};
