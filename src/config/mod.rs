//! Configuration for the authorization engine.
//!
//! The control plane is configured via a TOML file with per-section
//! structs; this module owns the section the policy engine reads.
//!
//! # Example
//!
//! ```toml
//! [authz]
//! api_base_path = "/api"
//! frontend_origin = "https://dashboard.example.com"
//! ```

use serde::{Deserialize, Serialize};

/// Authorization engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfig {
    /// Base path all API routes are mounted under (e.g. "/api").
    ///
    /// Stripped from request paths before any policy matching, so access
    /// rules and public-path patterns are written relative to the API root.
    #[serde(default = "default_api_base_path")]
    pub api_base_path: Option<String>,

    /// Origin of the trusted dashboard frontend.
    ///
    /// Session credentials (JWT or basic auth) are CORS-allowed from this
    /// origin only; API keys carry their own origin allow-lists.
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            api_base_path: default_api_base_path(),
            frontend_origin: default_frontend_origin(),
        }
    }
}

fn default_api_base_path() -> Option<String> {
    Some("/api".to_string())
}

fn default_frontend_origin() -> String {
    "http://localhost:3000".to_string()
}
