//! Resource pattern compilation and matching.
//!
//! Patterns are slash-delimited templates of literal segments, `:param`
//! single-segment captures, and a trailing `*` that swallows the rest of
//! the path. The wildcard is only legal in final position, so the grammar
//! is LL(1) and matching is a single forward walk over two segment lists
//! with no backtracking and no regular expressions.
//!
//! Compilation never fails. A malformed pattern (a `*` glued to other
//! text, or a wildcard before the final segment) is marked invalid, and an
//! invalid pattern matches nothing.

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly. A literal containing `?` can
    /// never match, since matching paths are query-stripped.
    Literal(String),
    /// Consumes exactly one path segment of any value.
    Param,
    /// Consumes all remaining path segments, including zero.
    Wildcard,
}

/// A compiled resource pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePattern {
    raw: String,
    segments: Vec<Segment>,
    valid: bool,
}

impl ResourcePattern {
    /// Compile a pattern string: strip one leading and one trailing `/`,
    /// split on `/`, classify each segment.
    pub fn compile(pattern: &str) -> Self {
        let trimmed = pattern.strip_prefix('/').unwrap_or(pattern);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let mut segments = Vec::new();
        let mut valid = true;

        if !trimmed.is_empty() {
            let parts: Vec<&str> = trimmed.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.iter().enumerate() {
                let segment = if *part == "*" {
                    if i != last {
                        valid = false;
                    }
                    Segment::Wildcard
                } else if part.contains('*') {
                    // "a*" or "*b": the only wildcard form is a bare "*".
                    valid = false;
                    Segment::Literal((*part).to_string())
                } else if part.starts_with(':') {
                    Segment::Param
                } else {
                    Segment::Literal((*part).to_string())
                };
                segments.push(segment);
            }
        }

        Self {
            raw: pattern.to_string(),
            segments,
            valid,
        }
    }

    /// The pattern text as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Walk pattern and path segments pairwise. Succeeds when both lists
    /// exhaust together, or when a wildcard consumes the remainder.
    pub fn matches(&self, path: &[String]) -> bool {
        if !self.valid {
            return false;
        }
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Wildcard => return true,
                Segment::Param => {
                    if i >= path.len() {
                        return false;
                    }
                    i += 1;
                }
                Segment::Literal(text) => {
                    match path.get(i) {
                        Some(s) if s == text => i += 1,
                        _ => return false,
                    }
                }
            }
        }
        i == path.len()
    }
}
