//! # ignore-tree-testkit
//!
//! Test doubles and fixtures for the ignore-tree ports.
//! This crate depends on `ports` and `shared`.

pub mod errors;
pub mod fixtures;
pub mod gated;
pub mod in_memory;

pub use gated::GatedListingSource;
pub use in_memory::{
    FailingListingSource, NoopLogger, NoopTelemetry, NoopTimer, RecordingLogger,
    RecordingRenderer, RenderCall, StaticListingSource,
};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
