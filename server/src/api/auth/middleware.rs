//! Authentication middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::context::AuthContext;
use super::jwt::{JwtError, SessionClaims};
use super::manager::AuthManager;
use crate::core::constants::SESSION_COOKIE_NAME;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_EXPIRED",
            message: "Session has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_INVALID",
            message: "Invalid session token".to_string(),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => Self::expired(),
            _ => Self::invalid(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
}

/// Validate the session cookie against the auth manager
pub fn authenticate(manager: &AuthManager, jar: &CookieJar) -> Result<SessionClaims, AuthError> {
    let cookie = jar.get(SESSION_COOKIE_NAME).ok_or_else(AuthError::required)?;
    if cookie.value().is_empty() {
        return Err(AuthError::required());
    }
    manager.validate_session(cookie.value()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AuthError::from(e)
    })
}

/// Session authentication middleware
///
/// Injects `AuthContext` into request extensions on success.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(&state.auth_manager, &jar)?;

    request.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
