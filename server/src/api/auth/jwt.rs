//! JWT session token handling

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT validation error
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token lifetime has passed
    #[error("Session token has expired")]
    Expired,
    /// Token signature is invalid
    #[error("Invalid session token signature")]
    InvalidSignature,
    /// Malformed token or any other validation failure
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn new(user_id: &str, email: &str, ttl_days: u32) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(ttl_days as i64);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Get the user ID from claims
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// Sign claims with HS256
pub fn sign_claims(signing_key: &[u8], claims: &SessionClaims) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| anyhow!("Failed to create JWT: {}", e))
}

/// Create a signed JWT session token
pub fn create_session_token(
    signing_key: &[u8],
    user_id: &str,
    email: &str,
    ttl_days: u32,
) -> Result<String> {
    sign_claims(signing_key, &SessionClaims::new(user_id, email, ttl_days))
}

/// Validate and decode a JWT session token
pub fn validate_session_token(token: &str, signing_key: &[u8]) -> Result<SessionClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data =
        decode::<SessionClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Invalid(e.to_string()),
            })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        vec![0u8; 32]
    }

    #[test]
    fn test_create_and_validate() {
        let key = test_key();
        let token = create_session_token(&key, "user123", "a@example.com", 7).unwrap();
        let claims = validate_session_token(&token, &key).unwrap();
        assert_eq!(claims.user_id(), "user123");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_invalid_signature() {
        let token = create_session_token(&[0u8; 32], "u", "a@example.com", 7).unwrap();
        assert!(matches!(
            validate_session_token(&token, &[1u8; 32]),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired() {
        let key = test_key();
        let mut claims = SessionClaims::new("u", "a@example.com", 7);
        claims.iat -= 10 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = sign_claims(&key, &claims).unwrap();
        assert!(matches!(
            validate_session_token(&token, &key),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            validate_session_token("not-a-jwt", &test_key()),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_unique_jti() {
        let c1 = SessionClaims::new("u", "a@example.com", 7);
        let c2 = SessionClaims::new("u", "a@example.com", 7);
        assert_ne!(c1.jti, c2.jti);
    }
}
