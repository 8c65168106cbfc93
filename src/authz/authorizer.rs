//! Per-request authorization orchestration.
//!
//! The authorizer combines the leaf components in a fixed order: parse the
//! credential, resolve the principal, canonicalize the path, run origin
//! (CORS) checks, gate admin-only routes, then evaluate the credential's
//! access rules. CORS hard-rejects fire before resource evaluation: an
//! admin CORS key or a disallowed origin is refused without the access
//! rules ever being consulted. The admin gate and the resource gate are
//! two independent sequential checks: an admin-only route is never
//! satisfied by resource rules alone.

use std::sync::Arc;

use dashmap::DashMap;
use http::{HeaderMap, Method, StatusCode};
use once_cell::sync::Lazy;
use uuid::Uuid;

use super::{
    AccessPolicy, AuthzError, CanonicalPath, CorsPolicy, CorsVerdict, PolicyError,
    cors::permitted_headers,
};
use crate::{
    auth::{ApiToken, Credential, IdentityResolver, Principal},
    config::AuthzConfig,
};

static ALLOW_ALL: Lazy<Arc<AccessPolicy>> = Lazy::new(|| Arc::new(AccessPolicy::allow_all()));

/// Per-route authorization requirements, declared where the route is
/// mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// Whether a credential must be presented at all.
    pub requires_auth: bool,

    /// Admin-only routes require `principal.is_admin` in addition to, never
    /// instead of, the credential's resource rules.
    pub any_admin: bool,
}

impl RouteSpec {
    /// A route callable without any credential.
    pub fn open() -> Self {
        Self {
            requires_auth: false,
            any_admin: false,
        }
    }

    /// A route requiring an authenticated principal.
    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            any_admin: false,
        }
    }

    /// A route requiring an admin principal.
    pub fn admin_only() -> Self {
        Self {
            requires_auth: true,
            any_admin: true,
        }
    }
}

impl Default for RouteSpec {
    fn default() -> Self {
        Self::authenticated()
    }
}

/// The request facts the engine evaluates, borrowed straight from the
/// HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct RequestFacts<'a> {
    pub method: &'a Method,

    /// Full rooted path as received, query string included. Must be the
    /// original request path, never a nested router's relative suffix.
    pub path: &'a str,

    /// Raw `Authorization` header value, if present.
    pub authorization: Option<&'a str>,

    /// Raw `Origin` header value, if present.
    pub origin: Option<&'a str>,
}

/// The authorization decision handed to the HTTP layer: short-circuit on
/// `allowed == false`, otherwise proceed and merge `cors_headers` into the
/// eventual response.
#[derive(Debug)]
pub struct Decision {
    pub allowed: bool,
    pub status: StatusCode,
    pub errors: Vec<String>,
    pub cors_headers: HeaderMap,

    /// Resolved principal for downstream handlers. `None` on denials and
    /// on anonymous open-route requests.
    pub principal: Option<Principal>,
}

impl Decision {
    fn allow(principal: Option<Principal>, cors_headers: HeaderMap) -> Self {
        Self {
            allowed: true,
            status: StatusCode::OK,
            errors: Vec::new(),
            cors_headers,
            principal,
        }
    }

    fn deny(status: StatusCode, message: String, cors_headers: HeaderMap) -> Self {
        Self {
            allowed: false,
            status,
            errors: vec![message],
            cors_headers,
            principal: None,
        }
    }

    fn forbid(error: AuthzError, cors_headers: HeaderMap) -> Self {
        Self::deny(error.status(), error.to_string(), cors_headers)
    }
}

/// The request-authorization engine.
///
/// Holds only process-wide, read-only state; every evaluation is pure
/// apart from the awaited identity-resolver lookup, so requests evaluate
/// fully in parallel with no locks.
pub struct Authorizer {
    resolver: Arc<dyn IdentityResolver>,
    api_base_path: Option<String>,
    cors: CorsPolicy,

    /// Memoized compiled policies keyed by token id. `ApiToken.access` is
    /// immutable once read from storage, so entries never go stale. Purely
    /// an optimization; correctness never depends on a hit.
    policies: DashMap<Uuid, Arc<AccessPolicy>>,
}

impl Authorizer {
    /// Build the engine. Fails when a code-defined rule set is defective,
    /// so a bad constant stops the process at startup instead of denying
    /// per-request.
    pub fn new(
        config: &AuthzConfig,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            resolver,
            api_base_path: config.api_base_path.clone(),
            cors: CorsPolicy::new(config.frontend_origin.clone())?,
            policies: DashMap::new(),
        })
    }

    /// Evaluate one request against a route declaration.
    pub async fn authorize(&self, request: RequestFacts<'_>, route: RouteSpec) -> Decision {
        let credential = Credential::from_header(request.authorization);
        let path = CanonicalPath::from_request(request.path, self.api_base_path.as_deref());

        // Preflights are allowed outright, any path, any origin.
        if let Some(origin) = request.origin
            && request.method == Method::OPTIONS
        {
            return Decision::allow(None, permitted_headers(origin));
        }

        if !credential.is_present() {
            let cors_headers = match request.origin {
                Some(origin) if self.cors.is_always_public(&path) => permitted_headers(origin),
                _ => HeaderMap::new(),
            };
            if route.requires_auth {
                return Decision::deny(
                    StatusCode::UNAUTHORIZED,
                    AuthzError::MissingCredential.to_string(),
                    cors_headers,
                );
            }
            return Decision::allow(None, cors_headers);
        }

        // The one suspension point; awaited before any decision is made.
        let principal = match self.resolver.resolve(&credential).await {
            Ok(principal) => principal,
            Err(err) => {
                tracing::debug!(error = %err, "identity resolution failed");
                return Decision::deny(err.status(), err.to_string(), HeaderMap::new());
            }
        };

        let mut cors_headers = HeaderMap::new();
        if let Some(origin) = request.origin {
            match self
                .cors
                .evaluate(&credential, Some(&principal), origin, request.method, &path)
            {
                CorsVerdict::Preflight(headers) | CorsVerdict::Allowed(headers) => {
                    cors_headers = headers;
                }
                CorsVerdict::Uncovered => {}
                CorsVerdict::Rejected { error, headers } => {
                    tracing::debug!(
                        origin = %origin,
                        path = %path,
                        error = %error,
                        "cors evaluation rejected request"
                    );
                    return Decision::forbid(error, headers);
                }
            }
        }

        if route.any_admin && !principal.is_admin {
            tracing::debug!(user_id = %principal.user_id, path = %path, "admin gate failed");
            return Decision::forbid(AuthzError::AdminRequired, cors_headers);
        }

        let policy = self.policy_for(principal.token.as_ref());
        if !policy.permits(request.method.as_str(), &path) {
            tracing::debug!(
                user_id = %principal.user_id,
                method = %request.method,
                path = %path,
                "access rules denied request"
            );
            return Decision::forbid(AuthzError::ResourceForbidden, cors_headers);
        }

        Decision::allow(Some(principal), cors_headers)
    }

    /// Compiled policy for the presented token. Session credentials carry
    /// no token and are unrestricted by rules.
    fn policy_for(&self, token: Option<&ApiToken>) -> Arc<AccessPolicy> {
        let Some(token) = token else {
            return ALLOW_ALL.clone();
        };
        if let Some(policy) = self.policies.get(&token.id) {
            return policy.clone();
        }
        let rules = token.access.as_ref().and_then(|a| a.rules.as_deref());
        let policy = Arc::new(AccessPolicy::compile(rules));
        if !policy.is_valid() {
            tracing::warn!(
                token_id = %token.id,
                "token access rules are malformed; denying all requests for this token"
            );
        }
        self.policies.insert(token.id, policy.clone());
        policy
    }
}
