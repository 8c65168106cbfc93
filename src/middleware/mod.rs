//! Axum integration for the authorization engine.

mod authorize;

pub use authorize::authorize_middleware;
