//! Authentication API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::{Auth, AuthManager, AuthState, password, require_auth};
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, ErrorBody};
use crate::data::TransactionalService;
use crate::data::sqlite::repositories::DUPLICATE_USER_EMAIL;
use crate::data::types::UserRow;

const CREDENTIALS_REQUIRED: &str = "email and password required";

/// Register and login body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "email and password required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email and password required"))]
    pub password: String,
}

impl CredentialsRequest {
    /// Emails are matched case-insensitively, ignoring surrounding whitespace
    fn normalized_email(&self) -> Result<String, ApiError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ApiError::bad_request("VALIDATION_ERROR", CREDENTIALS_REQUIRED));
        }
        Ok(email)
    }
}

/// Account identity returned by register, login and me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<UserRow> for UserResponse {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Auth state with database access
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Arc<TransactionalService>,
}

/// Create auth routes
pub fn routes(auth_manager: Arc<AuthManager>, database: Arc<TransactionalService>) -> Router {
    let me = Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            AuthState {
                auth_manager: auth_manager.clone(),
            },
            require_auth,
        ));

    let state = AuthRoutesState {
        auth_manager,
        database,
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
        .merge(me)
}

/// PBKDF2 is CPU bound; keep it off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Password hashing task failed");
        ApiError::internal("Password hashing failed")
    })
}

fn session_response(
    state: &AuthRoutesState,
    jar: CookieJar,
    user: UserRow,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let jwt = state
        .auth_manager
        .issue_session(&user.id, &user.email)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to issue session token");
            ApiError::internal("Failed to create session")
        })?;
    Ok((
        jar.add(state.auth_manager.session_cookie(jwt)),
        Json(user.into()),
    ))
}

/// Create an account and start a session
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created, session cookie set", body = UserResponse),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), ApiError> {
    let email = request.normalized_email()?;
    let repo = state.database.repository();

    if repo.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("CONFLICT", DUPLICATE_USER_EMAIL));
    }

    let rounds = state.auth_manager.password_rounds();
    let password_hash =
        run_blocking(move || password::hash_password_with_rounds(&request.password, rounds))
            .await?;
    let user = repo.create_user(&email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let (jar, body) = session_response(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// Start a session for an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session cookie set", body = UserResponse),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let invalid = || ApiError::unauthorized("INVALID_CREDENTIALS", "invalid credentials");

    let email = request.normalized_email()?;
    let Some(user) = state.database.repository().get_user_by_email(&email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(invalid());
    };

    let stored = user.password_hash.clone();
    let ok = run_blocking(move || password::verify_password(&request.password, &stored)).await?;
    if !ok {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    session_response(&state, jar, user)
}

/// Logout - clear session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session cookie cleared")
    )
)]
pub async fn logout(State(state): State<AuthRoutesState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.add(state.auth_manager.removal_cookie()),
    )
}

/// Current session identity
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Session owner", body = UserResponse),
        (status = 401, description = "Missing, expired or invalid session", body = ErrorBody)
    )
)]
pub async fn me(auth: Auth) -> Json<UserResponse> {
    let Auth(context) = auth;
    Json(UserResponse {
        id: context.user_id,
        email: context.email,
    })
}
