//! Error code fixtures for ignore-tree tests.

use ignore_tree_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Core codes the use cases surface.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::cancelled(),
        ErrorCode::invalid_input(),
        ErrorCode::not_found(),
        ErrorCode::timeout(),
        ErrorCode::internal(),
    ]
}

/// Codes raised by pattern validation and list edits.
pub fn pattern_error_codes() -> Vec<ErrorCode> {
    ["empty_path", "invalid_segment", "unsupported_syntax", "unknown_pattern"]
        .into_iter()
        .map(|code| ErrorCode::new("pattern", code))
        .collect()
}

/// A cancellation error fixture.
pub fn cancelled_error() -> ErrorEnvelope {
    ErrorEnvelope::cancelled("cancelled")
}

/// A retriable listing failure, as a flaky browse endpoint would report.
pub fn listing_unavailable_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("listing", "unavailable"),
        "listing source unavailable",
        ErrorClass::Retriable,
    )
}

/// A retriable timeout error fixture.
pub fn timeout_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(ErrorCode::timeout(), "timeout", ErrorClass::Retriable)
}
