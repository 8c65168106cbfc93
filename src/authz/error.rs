//! Authorization failure taxonomy.
//!
//! Every variant is terminal and non-retriable, surfaced verbatim to the
//! caller as an `errors` array plus status code. A malformed token policy
//! is never a 500: it degrades to `ResourceForbidden` through deny-all
//! compilation, so one misconfigured token cannot take the system down.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// No credential on a route that requires one.
    #[error("no credential provided")]
    MissingCredential,

    /// The route is admin-only and the principal is not an admin.
    #[error("admin access required")]
    AdminRequired,

    /// The credential's access rules do not cover this method and path.
    #[error("access forbidden for requested resource")]
    ResourceForbidden,

    /// The token's CORS grant does not cover the request origin. A hard
    /// reject: the request never reaches its handler.
    #[error("credential disallows CORS access from origin {origin}")]
    CorsOriginDisallowed { origin: String },

    /// Admin credentials may not be used cross-origin at all.
    #[error("cors access is not available to admins")]
    CorsAdminDisallowed,

    /// Origin allowed, but the API is outside the restricted allow-list
    /// and the grant lacks full access.
    #[error("access forbidden for CORS-enabled API key with restricted access")]
    CorsRestrictedApi,
}

impl AuthzError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::AdminRequired
            | Self::ResourceForbidden
            | Self::CorsOriginDisallowed { .. }
            | Self::CorsAdminDisallowed
            | Self::CorsRestrictedApi => StatusCode::FORBIDDEN,
        }
    }
}
