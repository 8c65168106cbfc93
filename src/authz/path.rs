//! Request path canonicalization.
//!
//! All policy matching happens against the full rooted path with the query
//! string dropped and the configured API base path removed. Prefix
//! stripping is segment-boundary aware: `/api-not/foo` is not prefixed by
//! `/api`. The canonical path is the same no matter which nested
//! sub-router handled the request; callers must hand in the original
//! request path, never a router-relative suffix.

use std::fmt;

/// A query-stripped, prefix-stripped request path, split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    segments: Vec<String>,
}

impl CanonicalPath {
    /// Canonicalize a raw request path against an optional API base path.
    pub fn from_request(raw: &str, api_base_path: Option<&str>) -> Self {
        let path = raw.split('?').next().unwrap_or(raw);
        let mut segments = split_segments(path);

        if let Some(prefix) = api_base_path {
            let prefix_segments = split_segments(prefix);
            if !prefix_segments.is_empty()
                && segments.len() >= prefix_segments.len()
                && segments[..prefix_segments.len()] == prefix_segments[..]
            {
                segments.drain(..prefix_segments.len());
            }
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Trim one leading and one trailing `/`, then split on `/`.
fn split_segments(path: &str) -> Vec<String> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_query_string_dropped() {
        let path = CanonicalPath::from_request("/stream?limit=10&cursor=abc", None);
        assert_eq!(path.segments(), ["stream"]);
    }

    #[test]
    fn test_prefix_stripping_consistency() {
        // /api/foo under prefix /api canonicalizes the same as /foo with
        // no prefix at all.
        let prefixed = CanonicalPath::from_request("/api/foo", Some("/api"));
        let bare = CanonicalPath::from_request("/foo", None);
        assert_eq!(prefixed, bare);
    }

    #[rstest]
    #[case("/api/stream/abc", Some("/api"), &["stream", "abc"])]
    #[case("/api-not/stream", Some("/api"), &["api-not", "stream"])]
    #[case("/stream/abc", Some("/api"), &["stream", "abc"])]
    #[case("/api/v2/stream", Some("/api/v2"), &["stream"])]
    #[case("/api/stream", Some("api/"), &["stream"])]
    #[case("/stream", None, &["stream"])]
    fn test_segment_boundary_prefix(
        #[case] raw: &str,
        #[case] prefix: Option<&str>,
        #[case] expected: &[&str],
    ) {
        let path = CanonicalPath::from_request(raw, prefix);
        assert_eq!(path.segments(), expected);
    }

    #[test]
    fn test_root_path_is_empty() {
        assert!(CanonicalPath::from_request("/", None).segments().is_empty());
        assert!(
            CanonicalPath::from_request("/api", Some("/api"))
                .segments()
                .is_empty()
        );
    }

    #[test]
    fn test_display_renders_rooted() {
        let path = CanonicalPath::from_request("/api/stream/abc", Some("/api"));
        assert_eq!(path.to_string(), "/stream/abc");
    }
}
