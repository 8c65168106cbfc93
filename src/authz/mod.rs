//! Request authorization: pattern matching, access policies, the CORS
//! layer, and the per-request orchestration that combines them.
//!
//! Evaluation per request:
//! 1. Parse the `Authorization` header into a typed credential
//! 2. Resolve the principal through the external identity resolver
//! 3. Canonicalize the path (query stripped, API base path removed)
//! 4. Run origin (CORS) checks; their hard rejects fire first
//! 5. Gate admin-only routes on `principal.is_admin`
//! 6. Evaluate the credential's access rules
//! 7. Emit an allow/deny decision plus CORS response headers
//!
//! The admin gate and the resource gate are deliberately two separate
//! checks combined with AND; an admin-only route is never satisfied by
//! resource rules alone.

mod authorizer;
mod cors;
mod error;
mod path;
mod pattern;
mod policy;

pub use authorizer::{Authorizer, Decision, RequestFacts, RouteSpec};
pub use cors::{CorsPolicy, CorsVerdict};
pub use error::AuthzError;
pub use path::CanonicalPath;
pub use pattern::{ResourcePattern, Segment};
pub use policy::{AccessPolicy, PolicyError};
