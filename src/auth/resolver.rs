//! Identity resolution seam.
//!
//! The engine consumes an already-authenticated principal; turning a
//! credential into one (JWT verification, token-store lookups, password
//! checks) belongs to the control plane behind this trait. The resolver
//! call is the single suspension point in request evaluation and is always
//! awaited before any policy decision is made.

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;

use super::{Credential, Principal};

/// Resolves a parsed credential to a principal.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &Credential) -> Result<Principal, ResolveError>;
}

/// Resolution failure taxonomy.
///
/// Status and message pass through the authorizer to the caller unchanged;
/// the engine never rewrites or downgrades them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The credential is malformed or fails verification.
    #[error("{0}")]
    InvalidCredential(String),

    /// No principal exists for the credential.
    #[error("{0}")]
    UnknownPrincipal(String),

    /// The credential existed but has expired.
    #[error("{0}")]
    Expired(String),

    /// The principal exists but has not completed verification.
    #[error("{0}")]
    Unverified(String),
}

impl ResolveError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredential(_) | Self::Expired(_) => StatusCode::UNAUTHORIZED,
            Self::UnknownPrincipal(_) => StatusCode::NOT_FOUND,
            Self::Unverified(_) => StatusCode::FORBIDDEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ResolveError::InvalidCredential("bad jwt".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ResolveError::Expired("token expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ResolveError::UnknownPrincipal("token not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ResolveError::Unverified("email not verified".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_message_passes_through_verbatim() {
        let err = ResolveError::UnknownPrincipal("token not found".into());
        assert_eq!(err.to_string(), "token not found");
    }
}
