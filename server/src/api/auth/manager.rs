//! Authentication manager

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::constants::{PASSWORD_HASH_ROUNDS, SESSION_COOKIE_NAME};
use crate::core::{AuthConfig, KeySource, SigningKey};

/// Issues and validates session tokens and builds the session cookie
#[derive(Debug)]
pub struct AuthManager {
    signing_key: SigningKey,
    session_ttl_days: u32,
    secure_cookie: bool,
    password_rounds: u32,
}

impl AuthManager {
    pub fn new(signing_key: SigningKey, config: &AuthConfig) -> Self {
        match signing_key.source {
            KeySource::Configured => tracing::debug!("JWT signing key from configuration"),
            KeySource::Persisted => tracing::debug!("JWT signing key loaded from data directory"),
            KeySource::Generated => tracing::info!("Generated new JWT signing key"),
        }
        if !config.secure_cookie {
            tracing::debug!("Session cookie without Secure flag (SameSite=Lax)");
        }

        Self {
            signing_key,
            session_ttl_days: config.session_ttl_days,
            secure_cookie: config.secure_cookie,
            password_rounds: PASSWORD_HASH_ROUNDS,
        }
    }

    /// Cheap hashing for tests that register many users
    #[cfg(test)]
    pub fn with_password_rounds(mut self, rounds: u32) -> Self {
        self.password_rounds = rounds;
        self
    }

    /// PBKDF2 work factor for new password hashes
    pub fn password_rounds(&self) -> u32 {
        self.password_rounds
    }

    pub fn session_ttl_days(&self) -> u32 {
        self.session_ttl_days
    }

    /// Create a signed session token for a user
    pub fn issue_session(&self, user_id: &str, email: &str) -> Result<String> {
        create_session_token(
            &self.signing_key.key,
            user_id,
            email,
            self.session_ttl_days,
        )
    }

    /// Validate a JWT session token
    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key.key)
    }

    /// `token` cookie carrying a session JWT
    pub fn session_cookie(&self, jwt: String) -> Cookie<'static> {
        self.cookie(jwt, time::Duration::days(self.session_ttl_days as i64))
    }

    /// Expired `token` cookie with matching attributes, for logout
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), time::Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        let same_site = if self.secure_cookie {
            SameSite::None
        } else {
            SameSite::Lax
        };
        Cookie::build((SESSION_COOKIE_NAME, value))
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(same_site)
            .path("/")
            .max_age(max_age)
            .build()
    }
}
