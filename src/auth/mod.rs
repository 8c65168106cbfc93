//! Request identity: credential parsing, persisted token shapes, and the
//! resolver seam to the control plane's credential store.

mod credential;
mod error;
mod principal;
mod resolver;
mod token;

pub use credential::Credential;
pub use error::AuthError;
pub use principal::Principal;
pub use resolver::{IdentityResolver, ResolveError};
pub use token::{AccessRule, ApiToken, CorsGrant, TokenAccess, validate_grant};
