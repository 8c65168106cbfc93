//! Request-authorization policy engine for the Aqueduct streaming control
//! plane.
//!
//! For every inbound HTTP request the engine decides whether the presented
//! credential may perform that method on that resource, and whether a
//! browser-originated request may proceed at all. It consumes an
//! already-authenticated principal, looked up through the
//! [`auth::IdentityResolver`] seam, and produces an allow/deny
//! [`authz::Decision`] plus CORS response headers. Verifying JWT
//! signatures, hashing passwords, and reading the token store are the
//! control plane's job, not this crate's.
//!
//! The [`middleware`] module adapts the engine to axum; everything under
//! [`authz`] is plain synchronous evaluation apart from the resolver call.

pub mod auth;
pub mod authz;
pub mod config;
pub mod middleware;

pub use auth::{Credential, IdentityResolver, Principal, ResolveError};
pub use authz::{Authorizer, Decision, RequestFacts, RouteSpec};
pub use config::AuthzConfig;
