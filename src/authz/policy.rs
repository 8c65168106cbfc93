//! Compiled access policies.
//!
//! A credential's `rules` compile once into an [`AccessPolicy`]. The two
//! degenerate forms fall out of the data model: absent rules permit
//! everything, an empty rule list permits nothing.
//!
//! Token-supplied policies are fail-closed: a defective rule set
//! (textually duplicated resource entries, malformed wildcard) compiles to
//! a policy that denies every request rather than raising. The defect is
//! recorded on the compiled policy as a `valid` flag and `permits`
//! short-circuits on it, so a misconfigured token costs its owner access
//! without ever becoming a 500. Code-defined rule sets go through
//! [`AccessPolicy::compile_strict`], which surfaces the defect so startup
//! can fail fast.

use std::collections::HashSet;

use thiserror::Error;

use super::{CanonicalPath, ResourcePattern};
use crate::auth::AccessRule;

/// Defect found while compiling a code-defined rule set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("duplicate resource pattern `{0}` in access rule")]
    DuplicateResource(String),

    #[error("malformed resource pattern `{0}`")]
    MalformedPattern(String),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    patterns: Vec<ResourcePattern>,
    /// Lowercased method names; `None` matches any method.
    methods: Option<Vec<String>>,
    valid: bool,
}

impl CompiledRule {
    fn compile(rule: &AccessRule) -> Self {
        let mut seen = HashSet::new();
        let mut valid = true;
        let mut patterns = Vec::with_capacity(rule.resources.len());

        for resource in &rule.resources {
            if !seen.insert(resource.as_str()) {
                valid = false;
            }
            let pattern = ResourcePattern::compile(resource);
            if !pattern.is_valid() {
                valid = false;
            }
            patterns.push(pattern);
        }

        let methods = rule
            .methods
            .as_ref()
            .map(|methods| methods.iter().map(|m| m.to_ascii_lowercase()).collect());

        Self {
            patterns,
            methods,
            valid,
        }
    }

    fn defect(rule: &AccessRule) -> Option<PolicyError> {
        let mut seen = HashSet::new();
        for resource in &rule.resources {
            if !seen.insert(resource.as_str()) {
                return Some(PolicyError::DuplicateResource(resource.clone()));
            }
            if !ResourcePattern::compile(resource).is_valid() {
                return Some(PolicyError::MalformedPattern(resource.clone()));
            }
        }
        None
    }

    fn matches(&self, method: &str, path: &CanonicalPath) -> bool {
        if !self.valid {
            return false;
        }
        if let Some(methods) = &self.methods
            && !methods.iter().any(|m| m.eq_ignore_ascii_case(method))
        {
            return false;
        }
        self.patterns.iter().any(|p| p.matches(path.segments()))
    }
}

/// A compiled, immutable access policy.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// `None` is the unrestricted degenerate form (a token without rules).
    rules: Option<Vec<CompiledRule>>,
    valid: bool,
}

impl AccessPolicy {
    /// Compile a token-supplied rule set. Never fails; any defect makes
    /// the whole policy deny-all, since any-rule-matches semantics would
    /// otherwise let the surviving rules hide it.
    pub fn compile(rules: Option<&[AccessRule]>) -> Self {
        let compiled: Option<Vec<CompiledRule>> =
            rules.map(|rules| rules.iter().map(CompiledRule::compile).collect());
        let valid = compiled
            .as_ref()
            .is_none_or(|rules| rules.iter().all(|r| r.valid));
        Self {
            rules: compiled,
            valid,
        }
    }

    /// Compile a code-defined rule set, surfacing the first defect instead
    /// of degrading. Call at startup only.
    pub fn compile_strict(rules: &[AccessRule]) -> Result<Self, PolicyError> {
        for rule in rules {
            if let Some(defect) = CompiledRule::defect(rule) {
                return Err(defect);
            }
        }
        Ok(Self::compile(Some(rules)))
    }

    /// The unrestricted policy.
    pub fn allow_all() -> Self {
        Self {
            rules: None,
            valid: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether `method` on `path` is permitted. Method comparison is
    /// case-insensitive.
    pub fn permits(&self, method: &str, path: &CanonicalPath) -> bool {
        if !self.valid {
            return false;
        }
        match &self.rules {
            None => true,
            Some(rules) => rules.iter().any(|r| r.matches(method, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn rule(resources: &[&str], methods: Option<&[&str]>) -> AccessRule {
        AccessRule {
            resources: resources.iter().map(|s| s.to_string()).collect(),
            methods: methods.map(|m| m.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn path(p: &str) -> CanonicalPath {
        CanonicalPath::from_request(p, None)
    }

    #[test]
    fn test_absent_rules_permit_everything() {
        let policy = AccessPolicy::compile(None);
        assert!(policy.permits("GET", &path("/anything")));
        assert!(policy.permits("DELETE", &path("/a/b/c")));
    }

    #[test]
    fn test_empty_rules_permit_nothing() {
        let policy = AccessPolicy::compile(Some(&[]));
        assert!(!policy.permits("GET", &path("/anything")));
        assert!(!policy.permits("GET", &path("/")));
    }

    #[test]
    fn test_any_rule_match_suffices() {
        let rules = [
            rule(&["stream"], None),
            rule(&["asset/:id"], Some(&["get"])),
        ];
        let policy = AccessPolicy::compile(Some(&rules));
        assert!(policy.permits("POST", &path("/stream")));
        assert!(policy.permits("GET", &path("/asset/abc")));
        assert!(!policy.permits("POST", &path("/asset/abc")));
        assert!(!policy.permits("GET", &path("/webhook")));
    }

    #[test]
    fn test_rule_count_monotonic() {
        // Adding a rule never revokes access: the outcome is an OR over
        // rules, so ordering and count only ever widen it.
        let base = [rule(&["stream"], None)];
        let widened = [rule(&["asset"], None), rule(&["stream"], None)];
        let narrow = AccessPolicy::compile(Some(&base));
        let wide = AccessPolicy::compile(Some(&widened));
        for p in ["/stream", "/asset", "/webhook"] {
            if narrow.permits("GET", &path(p)) {
                assert!(wide.permits("GET", &path(p)));
            }
        }
    }

    #[test]
    fn test_duplicate_resources_invalidate_policy() {
        let rules = [rule(&["x", "x"], None)];
        let policy = AccessPolicy::compile(Some(&rules));
        assert!(!policy.is_valid());
        assert!(!policy.permits("GET", &path("/x")));
    }

    #[test]
    fn test_defective_rule_poisons_sibling_rules() {
        // Fail-closed: the healthy rule would otherwise hide the defect.
        let rules = [rule(&["stream"], None), rule(&["a/*b"], None)];
        let policy = AccessPolicy::compile(Some(&rules));
        assert!(!policy.is_valid());
        assert!(!policy.permits("GET", &path("/stream")));
    }

    #[rstest]
    #[case("PATCH", "/foo", false)]
    #[case("OPTIONS", "/foo", true)]
    #[case("GET", "/foo/bar", true)]
    #[case("PATCH", "/foo/bar", true)]
    #[case("DELETE", "/foo/bar", false)]
    fn test_method_scoped_rules(#[case] method: &str, #[case] p: &str, #[case] expected: bool) {
        let rules = [
            rule(&["foo"], Some(&["options"])),
            rule(&["foo/bar"], Some(&["get", "patch"])),
        ];
        let policy = AccessPolicy::compile(Some(&rules));
        assert_eq!(policy.permits(method, &path(p)), expected);
    }

    #[test]
    fn test_method_comparison_ignores_case() {
        let rules = [rule(&["stream"], Some(&["GET"]))];
        let policy = AccessPolicy::compile(Some(&rules));
        assert!(policy.permits("get", &path("/stream")));
        assert!(policy.permits("GET", &path("/stream")));
    }

    #[test]
    fn test_strict_compile_surfaces_defects() {
        let dup = [rule(&["x", "x"], None)];
        assert_eq!(
            AccessPolicy::compile_strict(&dup).unwrap_err(),
            PolicyError::DuplicateResource("x".to_string())
        );

        let malformed = [rule(&["a/*b"], None)];
        assert_eq!(
            AccessPolicy::compile_strict(&malformed).unwrap_err(),
            PolicyError::MalformedPattern("a/*b".to_string())
        );

        let healthy = [rule(&["stream/*"], Some(&["get"]))];
        assert!(AccessPolicy::compile_strict(&healthy).is_ok());
    }

    #[test]
    fn test_permits_is_pure() {
        let rules = [rule(&["stream/:id"], Some(&["get"]))];
        let policy = AccessPolicy::compile(Some(&rules));
        let p = path("/stream/abc");
        let first = policy.permits("GET", &p);
        for _ in 0..10 {
            assert_eq!(policy.permits("GET", &p), first);
        }
    }
}
