//! Resolved request identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiToken, CorsGrant, TokenAccess};

/// The authenticated identity making a request, as produced by the
/// external identity resolver. The engine reads it, never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,

    #[serde(default)]
    pub is_admin: bool,

    /// Present when the credential was an API key; session credentials
    /// (JWT, basic) resolve without a token and are unrestricted by rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<ApiToken>,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: false,
            token: None,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: true,
            token: None,
        }
    }

    pub fn with_token(mut self, token: ApiToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Access restrictions of the presented token, if any.
    pub fn access(&self) -> Option<&TokenAccess> {
        self.token.as_ref().and_then(|t| t.access.as_ref())
    }

    /// CORS grant of the presented token, if any.
    pub fn cors_grant(&self) -> Option<&CorsGrant> {
        self.access().and_then(|a| a.cors.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_accessors_traverse_optional_layers() {
        let user_id = Uuid::new_v4();
        let principal = Principal::new(user_id);
        assert!(principal.access().is_none());
        assert!(principal.cors_grant().is_none());

        let token = ApiToken {
            id: Uuid::new_v4(),
            user_id,
            name: None,
            access: Some(TokenAccess {
                rules: None,
                cors: Some(CorsGrant::default()),
            }),
            created_at: Utc::now(),
            expires_at: None,
        };
        let principal = Principal::new(user_id).with_token(token);
        assert!(principal.access().is_some());
        assert!(principal.cors_grant().is_some());
        assert!(!principal.is_admin);
        assert!(Principal::admin(user_id).is_admin);
    }
}
