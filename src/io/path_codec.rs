//! Scope-bearing package paths.
//!
//! Every package entry lives at
//!
//! ```text
//! <root>/<category>/[<access-scope>/][org_<id>/]<name>.<ext>
//! ```
//!
//! The access-scope segment is present only for access-scoped kinds
//! (UI resources and endpoints). The organization segment is present only for
//! tenant-scoped entities; its absence means the entity is global.
//!
//! Decoding recovers the access scope and organization from a path. Encoding
//! followed by decoding yields the same scope and organization for every legal
//! input.

use crate::models::{AccessScope, ComponentKind};
use crate::{Error, Result};

/// Root of the metadata subtree.
pub const METADATA_ROOT: &str = "config";

/// Extension of metadata documents.
pub const METADATA_EXTENSION: &str = "yaml";

/// Prefix of the organization segment.
pub const ORG_MARKER: &str = "org_";

/// Scope values recovered from a package path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    /// Access scope, for access-scoped kinds.
    pub access_scope: Option<AccessScope>,
    /// Organization, `None` for global entities.
    pub organization_id: Option<i64>,
    /// Name relative to the scope directories, without extension.
    pub name: String,
}

/// Encodes and decodes the paths of one category under one root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    root: &'static str,
    category: &'static str,
    access_scoped: bool,
}

impl PathCodec {
    /// Creates a codec for a root and category.
    #[must_use]
    pub const fn new(root: &'static str, category: &'static str, access_scoped: bool) -> Self {
        Self {
            root,
            category,
            access_scoped,
        }
    }

    /// Codec for the metadata documents of a kind.
    #[must_use]
    pub const fn metadata(kind: ComponentKind) -> Self {
        Self::new(METADATA_ROOT, kind.as_str(), kind.is_access_scoped())
    }

    /// Codec for the content files of a kind, if the kind has content.
    #[must_use]
    pub const fn content(kind: ComponentKind) -> Option<Self> {
        match kind.content_root() {
            Some(root) => Some(Self::new(root, kind.as_str(), kind.is_access_scoped())),
            None => None,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub const fn root(&self) -> &'static str {
        self.root
    }

    /// Returns the category segment.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        self.category
    }

    /// Encodes a package-relative path.
    ///
    /// `access_scope` is ignored by codecs for kinds without access scope and
    /// defaults to [`AccessScope::Public`] for kinds that require one. `name`
    /// is used as given; callers sanitize free-form names with
    /// [`sanitize_name`] first.
    #[must_use]
    pub fn encode(
        &self,
        access_scope: Option<AccessScope>,
        organization_id: Option<i64>,
        name: &str,
        extension: &str,
    ) -> String {
        let mut path = format!("{}/{}/", self.root, self.category);
        if self.access_scoped {
            path.push_str(access_scope.unwrap_or_default().as_str());
            path.push('/');
        }
        if let Some(org) = organization_id {
            path.push_str(ORG_MARKER);
            path.push_str(&org.to_string());
            path.push('/');
        }
        path.push_str(name);
        path.push('.');
        path.push_str(extension);
        path
    }

    /// Decodes the scope of a path produced by [`encode`](Self::encode).
    ///
    /// The path may carry a prefix (for example an absolute package root);
    /// decoding starts at the first `<root>/<category>` pair. Backslash
    /// separators are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathDecode`] if the category marker or the name is
    /// missing, or if the access-scope segment is unknown.
    pub fn decode(&self, path: &str) -> Result<DecodedPath> {
        let normalized = path.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        let start = segments
            .windows(2)
            .position(|pair| pair[0] == self.root && pair[1] == self.category)
            .ok_or_else(|| decode_error(path, format!("missing '{}/{}'", self.root, self.category)))?;
        let mut rest = &segments[start + 2..];

        let access_scope = if self.access_scoped {
            let (segment, tail) = split_directory(rest)
                .ok_or_else(|| decode_error(path, "missing access scope segment"))?;
            rest = tail;
            Some(AccessScope::parse(segment).ok_or_else(|| {
                decode_error(path, format!("unknown access scope '{segment}'"))
            })?)
        } else {
            None
        };

        let mut organization_id = None;
        if let Some((segment, tail)) = split_directory(rest)
            && let Some(org) = parse_org_segment(segment)
        {
            organization_id = Some(org);
            rest = tail;
        }

        if rest.is_empty() {
            return Err(decode_error(path, "missing name"));
        }
        let joined = rest.join("/");
        let name = match joined.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') && !stem.is_empty() => stem.to_string(),
            _ => joined,
        };

        Ok(DecodedPath {
            access_scope,
            organization_id,
            name,
        })
    }
}

/// Parses `org_<id>`; anything else is part of the name.
fn parse_org_segment(segment: &str) -> Option<i64> {
    segment.strip_prefix(ORG_MARKER)?.parse().ok()
}

/// Splits off the leading segment if it is a directory (not the file name).
fn split_directory<'a, 'b>(segments: &'a [&'b str]) -> Option<(&'b str, &'a [&'b str])> {
    match segments {
        [first, tail @ ..] if !tail.is_empty() => Some((first, tail)),
        _ => None,
    }
}

fn decode_error(path: &str, reason: impl Into<String>) -> Error {
    Error::PathDecode {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Maps a free-form name onto a single safe path segment.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, as do the special
/// segments `.` and `..`. An empty name becomes `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Sanitizes each `/`-separated segment of a sub-path, dropping empty ones.
///
/// `/submit` stays `/submit`; `/a//b/` becomes `/a/b`; `/` becomes empty.
#[must_use]
pub fn sanitize_sub_path(sub_path: &str) -> String {
    sub_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", sanitize_name(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_encode_resource_metadata() {
        let codec = PathCodec::metadata(ComponentKind::Resource);
        assert_eq!(
            codec.encode(Some(AccessScope::Public), None, "home", "yaml"),
            "config/resource/public/home.yaml"
        );
        assert_eq!(
            codec.encode(Some(AccessScope::Global), Some(7), "home", "yaml"),
            "config/resource/global/org_7/home.yaml"
        );
    }

    #[test]
    fn test_encode_unscoped_kind_ignores_access_scope() {
        let codec = PathCodec::metadata(ComponentKind::Listener);
        assert_eq!(
            codec.encode(Some(AccessScope::Internal), Some(3), "USER_CREATED", "yaml"),
            "config/listener/org_3/USER_CREATED.yaml"
        );
    }

    #[test]
    fn test_content_codec_roots() {
        assert_eq!(
            PathCodec::content(ComponentKind::Resource).map(|c| c.root()),
            Some("resources")
        );
        assert_eq!(
            PathCodec::content(ComponentKind::Endpoint).map(|c| c.root()),
            Some("code")
        );
        assert!(PathCodec::content(ComponentKind::Privilege).is_none());
    }

    #[test]
    fn test_decode_endpoint_with_nested_name() {
        let codec = PathCodec::metadata(ComponentKind::Endpoint);
        let decoded = codec.decode("config/endpoint/public/home-POST-/submit.yaml").unwrap();
        assert_eq!(decoded.access_scope, Some(AccessScope::Public));
        assert_eq!(decoded.organization_id, None);
        assert_eq!(decoded.name, "home-POST-/submit");
    }

    #[test]
    fn test_decode_tolerates_prefix_and_backslashes() {
        let codec = PathCodec::metadata(ComponentKind::Resource);
        let decoded = codec
            .decode(r"C:\packages\bundle\config\resource\internal\org_12\home.yaml")
            .unwrap();
        assert_eq!(decoded.access_scope, Some(AccessScope::Internal));
        assert_eq!(decoded.organization_id, Some(12));
    }

    #[test]
    fn test_org_like_file_name_is_a_name() {
        let codec = PathCodec::metadata(ComponentKind::Form);
        let decoded = codec.decode("config/form/org_5.yaml").unwrap();
        assert_eq!(decoded.organization_id, None);
        assert_eq!(decoded.name, "org_5");
    }

    #[test]
    fn test_non_numeric_org_directory_is_part_of_name() {
        let codec = PathCodec::metadata(ComponentKind::Endpoint);
        let decoded = codec
            .decode("config/endpoint/public/org_chart-GET-/rows.yaml")
            .unwrap();
        assert_eq!(decoded.organization_id, None);
        assert_eq!(decoded.name, "org_chart-GET-/rows");
    }

    #[test_case("config/resource/public" ; "missing name")]
    #[test_case("config/resource/secret/home.yaml" ; "unknown scope")]
    #[test_case("config/form/home.yaml" ; "wrong category")]
    #[test_case("config/resource/home.yaml" ; "missing scope directory")]
    fn test_decode_failures(path: &str) {
        let codec = PathCodec::metadata(ComponentKind::Resource);
        assert!(matches!(codec.decode(path), Err(Error::PathDecode { .. })));
    }

    #[test_case("home", "home" ; "plain")]
    #[test_case("nightly cleanup:v2", "nightly_cleanup_v2" ; "spaces and colons")]
    #[test_case("..", "_" ; "parent segment")]
    #[test_case("", "_" ; "empty")]
    fn test_sanitize_name(input: &str, expected: &str) {
        assert_eq!(sanitize_name(input), expected);
    }

    #[test_case("/submit", "/submit" ; "single")]
    #[test_case("/a//b/", "/a/b" ; "collapsed")]
    #[test_case("/", "" ; "root")]
    #[test_case("/../etc", "/_/etc" ; "traversal")]
    fn test_sanitize_sub_path(input: &str, expected: &str) {
        assert_eq!(sanitize_sub_path(input), expected);
    }
}
