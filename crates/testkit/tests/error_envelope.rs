//! Integration tests for error envelopes crossing crate boundaries.

use ignore_tree_domain::{FolderId, PatternPath};
use ignore_tree_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind};
use ignore_tree_testkit::errors::{
    cancelled_error, listing_unavailable_error, pattern_error_codes, timeout_error,
};

#[test]
fn error_envelope_crosses_crates() {
    let timeout = timeout_error();
    assert_eq!(timeout.code, ErrorCode::timeout());
    assert_eq!(timeout.class, ErrorClass::Retriable);

    let boxed: Box<dyn std::error::Error> = Box::new(timeout);
    assert!(boxed.to_string().contains("timeout"));

    assert!(cancelled_error().is_cancelled());
    assert_eq!(listing_unavailable_error().kind, ErrorKind::Unexpected);
}

#[test]
fn domain_errors_map_to_pattern_codes() {
    let codes = pattern_error_codes();
    let envelopes = [PatternPath::parse("/"), PatternPath::parse("a/../b")]
        .into_iter()
        .filter_map(Result::err)
        .map(ErrorEnvelope::from);

    for envelope in envelopes {
        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert!(codes.contains(&envelope.code), "unexpected code {}", envelope.code);
        assert!(envelope.metadata.contains_key("input"));
    }
}

#[test]
fn folder_id_errors_use_domain_namespace() {
    let envelope = FolderId::parse("   ").map_err(ErrorEnvelope::from).err();
    assert_eq!(
        envelope.map(|envelope| envelope.code.namespace().to_owned()),
        Some("domain".to_owned())
    );
}
