//! JWT signing key resolution
//!
//! The key comes from `auth.jwt_secret` (config file or `LEADS_JWT_SECRET`)
//! when set. Otherwise a random 256-bit key is generated on first start and
//! persisted as hex in the data directory so sessions survive restarts.

use std::path::Path;

use anyhow::{Context, Result};

use super::config::AuthConfig;
use super::constants::JWT_KEY_FILENAME;
use super::storage::AppStorage;
use crate::utils::{crypto, file};

/// Where the active signing key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Configured,
    Persisted,
    Generated,
}

/// Resolved signing key
pub struct SigningKey {
    pub key: Vec<u8>,
    pub source: KeySource,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

impl SigningKey {
    /// Resolve the signing key for this process
    pub fn resolve(config: &AuthConfig, storage: &AppStorage) -> Result<Self> {
        if let Some(secret) = &config.jwt_secret {
            tracing::debug!("Using configured JWT secret");
            return Ok(Self {
                key: secret.as_bytes().to_vec(),
                source: KeySource::Configured,
            });
        }
        Self::load_or_generate(&storage.data_path(JWT_KEY_FILENAME))
    }

    fn load_or_generate(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read signing key: {}", path.display()))?;
            let key = crypto::decode_hex(&content)
                .with_context(|| format!("Corrupt signing key file: {}", path.display()))?;
            if key.is_empty() {
                anyhow::bail!("Signing key file is empty: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "Loaded persisted signing key");
            return Ok(Self {
                key,
                source: KeySource::Persisted,
            });
        }

        let key = crypto::generate_signing_key();
        file::write_private_file(path, hex::encode(&key).as_bytes())?;
        tracing::info!(path = %path.display(), "Generated new JWT signing key");
        Ok(Self {
            key,
            source: KeySource::Generated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            session_ttl_days: 7,
            secure_cookie: false,
            jwt_secret: secret.map(String::from),
        }
    }

    #[test]
    fn test_configured_secret_wins() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());
        let key = SigningKey::resolve(&auth_config(Some("shh")), &storage).unwrap();
        assert_eq!(key.source, KeySource::Configured);
        assert_eq!(key.key, b"shh");
        assert!(!dir.path().join(JWT_KEY_FILENAME).exists());
    }

    #[test]
    fn test_generated_then_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());

        let first = SigningKey::resolve(&auth_config(None), &storage).unwrap();
        assert_eq!(first.source, KeySource::Generated);
        assert_eq!(first.key.len(), 32);

        let second = SigningKey::resolve(&auth_config(None), &storage).unwrap();
        assert_eq!(second.source, KeySource::Persisted);
        assert_eq!(first.key, second.key);
    }

    #[test]
    fn test_corrupt_key_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(JWT_KEY_FILENAME), "not-hex").unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());
        assert!(SigningKey::resolve(&auth_config(None), &storage).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SigningKey {
            key: b"topsecret".to_vec(),
            source: KeySource::Configured,
        };
        assert!(!format!("{:?}", key).contains("topsecret"));
    }
}
