//! Origin-based (CORS) request policy.
//!
//! This layer is independent of resource/method permissions: it decides
//! whether a browser-originated request may proceed at all, and which CORS
//! response headers accompany the answer. Preflights and the always-public
//! endpoints (direct upload by token, playback lookup) pass for any
//! origin. Dashboard sessions pass from the trusted frontend origin.
//! CORS-enabled API keys are checked against their own origin allow-list
//! and, unless granted full access, against a fixed allow-list of callable
//! APIs on top of the token's own rules.

use http::{HeaderMap, HeaderValue, Method, header};

use super::{AccessPolicy, AuthzError, CanonicalPath, PolicyError, ResourcePattern};
use crate::auth::{AccessRule, Credential, Principal};

/// Methods advertised on every CORS-permitted response.
const ALLOW_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Paths exempt from origin restriction entirely, in resource-pattern
/// form relative to the API root.
const ALWAYS_PUBLIC_PATHS: &[&str] = &["asset/upload/direct/:token", "playback/:id/*"];

/// APIs a CORS-enabled key without full access may call. Independent of
/// the token's own rules, which still apply afterwards.
fn restricted_access_rules() -> Vec<AccessRule> {
    let get = |resources: &[&str]| AccessRule {
        resources: resources.iter().map(|s| s.to_string()).collect(),
        methods: Some(vec!["get".to_string()]),
    };
    vec![
        AccessRule {
            resources: vec!["asset/request-upload".to_string()],
            methods: Some(vec!["post".to_string()]),
        },
        get(&["asset/:id", "asset/:id/*"]),
        get(&["playback/:id"]),
        get(&["session/:id"]),
    ]
}

/// Outcome of CORS evaluation for a request carrying an `Origin` header.
#[derive(Debug)]
pub enum CorsVerdict {
    /// Preflight: terminal allow for any path and origin.
    Preflight(HeaderMap),

    /// Origin accepted; attach these headers and continue evaluation.
    Allowed(HeaderMap),

    /// No grant covers this origin: omit headers and continue. The browser
    /// blocks the response client-side; non-browser callers that happen to
    /// send an `Origin` header are unaffected.
    Uncovered,

    /// Hard rejection; the request must not reach its handler. Headers may
    /// still be present so the browser sees a clean CORS-permitted 403
    /// instead of a network-level failure.
    Rejected {
        error: AuthzError,
        headers: HeaderMap,
    },
}

/// The process-wide CORS policy: trusted frontend origin, always-public
/// patterns, and the compiled restricted allow-list. Built once at
/// startup, read-only afterwards.
#[derive(Debug)]
pub struct CorsPolicy {
    frontend_origin: String,
    always_public: Vec<ResourcePattern>,
    restricted: AccessPolicy,
}

impl CorsPolicy {
    /// Build the policy. Fails when a code-defined pattern or rule is
    /// defective, a programmer error that must stop startup, unlike
    /// token-supplied rules which degrade to deny-all.
    pub fn new(frontend_origin: impl Into<String>) -> Result<Self, PolicyError> {
        let always_public: Vec<ResourcePattern> = ALWAYS_PUBLIC_PATHS
            .iter()
            .map(|p| ResourcePattern::compile(p))
            .collect();
        for pattern in &always_public {
            if !pattern.is_valid() {
                return Err(PolicyError::MalformedPattern(pattern.raw().to_string()));
            }
        }
        Ok(Self {
            frontend_origin: frontend_origin.into(),
            always_public,
            restricted: AccessPolicy::compile_strict(&restricted_access_rules())?,
        })
    }

    /// Whether `path` is exempt from origin restriction entirely.
    pub fn is_always_public(&self, path: &CanonicalPath) -> bool {
        self.always_public.iter().any(|p| p.matches(path.segments()))
    }

    /// Evaluate a request that carries an `Origin` header.
    pub fn evaluate(
        &self,
        credential: &Credential,
        principal: Option<&Principal>,
        origin: &str,
        method: &Method,
        path: &CanonicalPath,
    ) -> CorsVerdict {
        if method == Method::OPTIONS {
            return CorsVerdict::Preflight(permitted_headers(origin));
        }
        if self.is_always_public(path) {
            return CorsVerdict::Allowed(permitted_headers(origin));
        }
        if credential.is_session() {
            if origin == self.frontend_origin {
                return CorsVerdict::Allowed(permitted_headers(origin));
            }
            return CorsVerdict::Uncovered;
        }

        let Some(grant) = principal.and_then(|p| p.cors_grant()) else {
            return CorsVerdict::Uncovered;
        };

        // Creation-time validation should make this unreachable; reject
        // before consulting the grant at all.
        if principal.is_some_and(|p| p.is_admin) {
            return CorsVerdict::Rejected {
                error: AuthzError::CorsAdminDisallowed,
                headers: HeaderMap::new(),
            };
        }

        if !grant.allows_origin(origin) {
            tracing::warn!(origin = %origin, path = %path, "origin not in token allow-list");
            return CorsVerdict::Rejected {
                error: AuthzError::CorsOriginDisallowed {
                    origin: origin.to_string(),
                },
                headers: HeaderMap::new(),
            };
        }

        if !grant.full_access && !self.restricted.permits(method.as_str(), path) {
            return CorsVerdict::Rejected {
                error: AuthzError::CorsRestrictedApi,
                headers: permitted_headers(origin),
            };
        }

        CorsVerdict::Allowed(permitted_headers(origin))
    }
}

/// The header set attached to every CORS-permitted response.
pub(crate) fn permitted_headers(origin: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers
}
