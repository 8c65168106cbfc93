//! Authentication-side errors.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Admin tokens must never be CORS-enabled; checked by the
    /// token-creation handler before persistence.
    #[error("cors api keys are not available to admins")]
    AdminCorsGrant,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AdminCorsGrant => StatusCode::FORBIDDEN,
        }
    }
}
