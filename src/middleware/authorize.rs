//! Authorization middleware.
//!
//! Runs the engine against every request: denials short-circuit as JSON
//! `{"errors": [...]}` bodies, allowed requests continue with the resolved
//! [`crate::auth::Principal`] in their extensions, and CORS headers are merged
//! into whichever response is eventually produced. Preflights are answered
//! here directly; they never reach a handler.
//!
//! Attach a route's [`RouteSpec`] with an `Extension` layered *outside*
//! this middleware so it is present by the time the engine runs:
//!
//! ```ignore
//! Router::new()
//!     .route("/admin/users", get(list_users))
//!     .layer(middleware::from_fn_with_state(authorizer, authorize_middleware))
//!     .layer(Extension(RouteSpec::admin_only()))
//! ```
//!
//! Routes without a `RouteSpec` extension default to
//! [`RouteSpec::authenticated`]: fail closed, never silently open.

use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{Method, StatusCode, header};
use serde_json::json;

use crate::authz::{Authorizer, Decision, RequestFacts, RouteSpec};

/// Middleware entry point; mount with `axum::middleware::from_fn_with_state`.
pub async fn authorize_middleware(
    State(authorizer): State<Arc<Authorizer>>,
    mut req: Request,
    next: Next,
) -> Response {
    // The engine always reasons about the full rooted path; OriginalUri
    // survives router nesting where `req.uri()` does not.
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
        .to_string();

    let route = req
        .extensions()
        .get::<RouteSpec>()
        .copied()
        .unwrap_or_default();
    let method = req.method().clone();
    let authorization = header_value(&req, header::AUTHORIZATION);
    let origin = header_value(&req, header::ORIGIN);

    let decision = authorizer
        .authorize(
            RequestFacts {
                method: &method,
                path: &path,
                authorization: authorization.as_deref(),
                origin: origin.as_deref(),
            },
            route,
        )
        .await;

    if !decision.allowed {
        return deny_response(decision);
    }

    // Preflights are answered here; there is no OPTIONS handler to reach.
    if method == Method::OPTIONS && origin.is_some() {
        let mut response = StatusCode::NO_CONTENT.into_response();
        merge_headers(&mut response, &decision.cors_headers);
        return response;
    }

    if let Some(principal) = decision.principal.clone() {
        req.extensions_mut().insert(principal);
    }

    let mut response = next.run(req).await;
    merge_headers(&mut response, &decision.cors_headers);
    response
}

fn header_value(req: &Request, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn deny_response(decision: Decision) -> Response {
    let mut response =
        (decision.status, Json(json!({ "errors": decision.errors }))).into_response();
    merge_headers(&mut response, &decision.cors_headers);
    response
}

fn merge_headers(response: &mut Response, cors_headers: &http::HeaderMap) {
    for (name, value) in cors_headers {
        response.headers_mut().insert(name.clone(), value.clone());
    }
}

// Exercised end-to-end in tests/authorization.rs; the unit here only pins
// the fail-closed default for routes missing a RouteSpec.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_route_spec_defaults_to_authenticated() {
        let spec = RouteSpec::default();
        assert!(spec.requires_auth);
        assert!(!spec.any_admin);
    }
}
