//! Property-based tests for package paths.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Decoding an encoded path recovers access scope and organization
//! - Sanitized names survive the encode/decode cycle unchanged
//! - Sanitizing is idempotent and never yields traversal segments
//! - Endpoint sub-paths keep their shape

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use compack::io::PathCodec;
use compack::io::path_codec::{sanitize_name, sanitize_sub_path};
use compack::models::{AccessScope, ComponentKind};
use proptest::prelude::*;

fn any_scope() -> impl Strategy<Value = AccessScope> {
    prop::sample::select(AccessScope::all().to_vec())
}

fn any_kind() -> impl Strategy<Value = ComponentKind> {
    prop::sample::select(ComponentKind::all().to_vec())
}

fn any_org() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(0i64..1_000_000)
}

proptest! {
    /// Property: decoding recovers the scope and organization that were encoded.
    #[test]
    fn prop_metadata_path_decodes_to_its_scope(
        kind in any_kind(),
        scope in any_scope(),
        org in any_org(),
        raw in "\\PC{0,40}",
    ) {
        let codec = PathCodec::metadata(kind);
        let name = sanitize_name(&raw);
        let path = codec.encode(Some(scope), org, &name, "yaml");
        let decoded = codec.decode(&path).unwrap();

        prop_assert_eq!(decoded.organization_id, org);
        prop_assert_eq!(decoded.name, name);
        if kind.is_access_scoped() {
            prop_assert_eq!(decoded.access_scope, Some(scope));
        } else {
            prop_assert_eq!(decoded.access_scope, None);
        }
    }

    /// Property: content paths decode the same way as metadata paths.
    #[test]
    fn prop_content_path_decodes_to_its_scope(
        kind in any_kind(),
        scope in any_scope(),
        org in any_org(),
        raw in "[a-zA-Z0-9 ._-]{1,30}",
    ) {
        if let Some(codec) = PathCodec::content(kind) {
            let name = sanitize_name(&raw);
            let path = codec.encode(Some(scope), org, &name, "js");
            let decoded = codec.decode(&path).unwrap();
            prop_assert_eq!(decoded.organization_id, org);
            prop_assert_eq!(decoded.name, name);
        }
    }

    /// Property: a package root prefix does not change the decoded scope.
    #[test]
    fn prop_prefixed_path_decodes(
        scope in any_scope(),
        org in any_org(),
        prefix in "p[0-9]{1,4}(/p[0-9]{1,4}){0,3}",
    ) {
        let codec = PathCodec::metadata(ComponentKind::Resource);
        let path = codec.encode(Some(scope), org, "home", "yaml");
        let decoded = codec.decode(&format!("/{prefix}/{path}")).unwrap();
        prop_assert_eq!(decoded.access_scope, Some(scope));
        prop_assert_eq!(decoded.organization_id, org);
    }

    /// Property: endpoint stems with nested sub-paths decode to the full stem.
    #[test]
    fn prop_endpoint_stem_survives(
        scope in any_scope(),
        org in any_org(),
        resource in "[a-z]{1,12}",
        sub_path in "(/[a-z0-9]{1,8}){0,4}",
    ) {
        let codec = PathCodec::metadata(ComponentKind::Endpoint);
        let stem = format!("{resource}-POST-{}", sanitize_sub_path(&sub_path));
        let path = codec.encode(Some(scope), org, &stem, "yaml");
        let decoded = codec.decode(&path).unwrap();
        prop_assert_eq!(decoded.name, stem);
        prop_assert_eq!(decoded.organization_id, org);
    }

    /// Property: sanitizing is idempotent and yields one safe segment.
    #[test]
    fn prop_sanitize_name_is_safe(raw in "\\PC{0,60}") {
        let once = sanitize_name(&raw);
        prop_assert_eq!(sanitize_name(&once), once.clone());
        prop_assert!(!once.is_empty());
        prop_assert!(!once.contains('/'));
        prop_assert!(!once.contains('\\'));
        prop_assert!(once != "." && once != "..");
    }

    /// Property: sanitized sub-paths are rooted and contain no empty or
    /// traversal segments.
    #[test]
    fn prop_sanitize_sub_path_is_safe(raw in "[a-z./]{0,40}") {
        let cleaned = sanitize_sub_path(&raw);
        prop_assert_eq!(sanitize_sub_path(&cleaned), cleaned.clone());
        if !cleaned.is_empty() {
            prop_assert!(cleaned.starts_with('/'));
            for segment in cleaned[1..].split('/') {
                prop_assert!(!segment.is_empty());
                prop_assert!(segment != "." && segment != "..");
            }
        }
    }
}
