//! Persisted API token shapes.
//!
//! These structs mirror the token documents the control plane stores;
//! field names are camelCase on the wire because the dashboard reads the
//! same documents. The engine treats them as read-only: tokens are looked
//! up by the identity resolver and evaluated here, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// A persisted API token, as read from the token store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: Uuid,

    /// Owning user.
    pub user_id: Uuid,

    /// Display name shown in the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declarative access restrictions. Absent means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<TokenAccess>,

    pub created_at: DateTime<Utc>,

    /// Expiry is enforced by the identity resolver at lookup time; an
    /// expired token never reaches policy evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Access restrictions attached to a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccess {
    /// `None` permits every request; `Some(vec![])` permits none.
    /// Otherwise a request is permitted iff any rule matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<AccessRule>>,

    /// CORS grant for browser use of this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsGrant>,
}

/// One access rule: resource patterns plus an optional method list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// Resource patterns in the literal / `:param` / trailing `*` grammar.
    pub resources: Vec<String>,

    /// Absent means any method. Compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

/// CORS grant carried by a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsGrant {
    /// Origins the browser may call from. May contain the literal `"*"`.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// When set, CORS calls are governed by the token's own rules alone;
    /// otherwise the restricted API allow-list applies on top of them.
    #[serde(default)]
    pub full_access: bool,
}

impl CorsGrant {
    /// Whether `origin` is acceptable under this grant.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == "*" || o == origin)
    }
}

/// Validate a token grant before persistence.
///
/// Called by the token-creation handler: admin tokens must never carry a
/// CORS grant, and the rejection happens before anything is stored.
pub fn validate_grant(is_admin: bool, access: Option<&TokenAccess>) -> Result<(), AuthError> {
    if is_admin && access.is_some_and(|a| a.cors.is_some()) {
        return Err(AuthError::AdminCorsGrant);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_deserializes_camel_case() {
        let token: ApiToken = serde_json::from_str(
            r#"{
                "id": "0a648941-99a1-4011-9668-acd340b6eca9",
                "userId": "e7a61936-2836-4c76-8dcb-68f932b1d1a8",
                "name": "ingest key",
                "access": {
                    "rules": [{"resources": ["stream/*"], "methods": ["get", "post"]}],
                    "cors": {"allowedOrigins": ["https://app.example.com"], "fullAccess": true}
                },
                "createdAt": "2026-01-12T09:30:00Z"
            }"#,
        )
        .expect("valid token document");

        let access = token.access.expect("access present");
        let rules = access.rules.expect("rules present");
        assert_eq!(rules[0].resources, vec!["stream/*"]);
        assert_eq!(
            rules[0].methods.as_deref(),
            Some(["get".to_string(), "post".to_string()].as_slice())
        );
        let cors = access.cors.expect("cors present");
        assert!(cors.full_access);
        assert_eq!(cors.allowed_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn test_cors_grant_origin_matching() {
        let grant = CorsGrant {
            allowed_origins: vec!["http://a.com".to_string()],
            full_access: false,
        };
        assert!(grant.allows_origin("http://a.com"));
        assert!(!grant.allows_origin("http://b.com"));

        let wildcard = CorsGrant {
            allowed_origins: vec!["*".to_string()],
            full_access: false,
        };
        assert!(wildcard.allows_origin("http://anything.example"));
    }

    #[test]
    fn test_admin_token_may_not_carry_cors_grant() {
        let access = TokenAccess {
            rules: None,
            cors: Some(CorsGrant::default()),
        };
        let err = validate_grant(true, Some(&access)).expect_err("must reject");
        assert_eq!(err.to_string(), "cors api keys are not available to admins");
    }

    #[test]
    fn test_grant_validation_accepts_everything_else() {
        assert!(validate_grant(false, None).is_ok());
        assert!(validate_grant(true, None).is_ok());
        assert!(
            validate_grant(
                true,
                Some(&TokenAccess {
                    rules: Some(vec![]),
                    cors: None
                })
            )
            .is_ok()
        );
        assert!(
            validate_grant(
                false,
                Some(&TokenAccess {
                    rules: None,
                    cors: Some(CorsGrant::default())
                })
            )
            .is_ok()
        );
    }
}
