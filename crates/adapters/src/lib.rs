//! # ignore-tree-adapters
//!
//! Port implementations:
//!
//! - pattern stores: [`InMemoryPatternStore`], [`FilePatternStore`]
//! - listing: [`LocalListingSource`] and the browse/ignores JSON decoders
//! - observability: [`JsonLogger`], [`TracingLogger`], [`JsonTelemetry`],
//!   [`InMemoryTelemetry`]
//!
//! This crate depends on `ports`, `domain`, `config`, and `shared`.

pub mod file_store;
pub mod listing;
pub mod log_sink;
pub mod logger;
pub mod pattern_store;
pub mod rest_json;
pub mod telemetry;
pub mod tracing_logger;

pub use file_store::{FilePatternStore, PatternFileError};
pub use listing::LocalListingSource;
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use pattern_store::InMemoryPatternStore;
pub use rest_json::{
    BrowseDecodeError, decode_browse, decode_browse_str, decode_ignores, encode_ignores,
};
pub use telemetry::{InMemoryTelemetry, JsonTelemetry};
pub use tracing_logger::{TracingLogger, init_tracing};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
