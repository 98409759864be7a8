//! Authentication extractor for Axum handlers
//!
//! ```no_run
//! # use leads_server::api::auth::Auth;
//! # use leads_server::api::types::ApiError;
//! pub async fn whoami(auth: Auth) -> Result<String, ApiError> {
//!     Ok(auth.user_id().to_string())
//! }
//! ```

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::context::AuthContext;
use super::middleware::AuthError;

/// Caller identity from the `require_auth` middleware.
///
/// Rejects with `AUTH_REQUIRED` when the route is not behind the middleware.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthContext);

impl Deref for Auth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Self)
            .ok_or_else(AuthError::required)
    }
}
