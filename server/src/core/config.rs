use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_FRONTEND_ORIGIN, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SESSION_TTL_DAYS, ENV_JWT_SECRET,
};

// =============================================================================
// File Config Structs (all fields optional, merged across files)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// CORS configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CorsFileConfig {
    pub frontend_origin: Option<String>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub session_ttl_days: Option<u32>,
    pub secure_cookie: Option<bool>,
    pub jwt_secret: Option<String>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub path: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub cors: Option<CorsFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(cors) = other.cors {
            let current = self.cors.get_or_insert_with(CorsFileConfig::default);
            if cors.frontend_origin.is_some() {
                current.frontend_origin = cors.frontend_origin;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.session_ttl_days.is_some() {
                current.session_ttl_days = auth.session_ttl_days;
            }
            if auth.secure_cookie.is_some() {
                current.secure_cookie = auth.secure_cookie;
            }
            if auth.jwt_secret.is_some() {
                current.jwt_secret = auth.jwt_secret;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                current.path = database.path;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub frontend_origin: String,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub session_ttl_days: u32,
    pub secure_cookie: bool,
    /// Explicit signing secret; a key is generated and persisted when absent
    pub jwt_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_ttl_days", &self.session_ttl_days)
            .field("secure_cookie", &self.secure_cookie)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Database configuration
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Explicit SQLite file; `None` means `<data dir>/sqlite/leads.db`
    pub path: Option<PathBuf>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.leads/leads.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::layer(cli, file_config, std::env::var(ENV_JWT_SECRET).ok());
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            frontend_origin = %config.cors.frontend_origin,
            secure_cookie = config.auth.secure_cookie,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn layer(cli: &CliConfig, file_config: FileConfig, env_secret: Option<String>) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_cors = file_config.cors.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let frontend_origin = cli
            .frontend_origin
            .clone()
            .or(file_cors.frontend_origin)
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());

        let session_ttl_days = cli
            .session_ttl_days
            .or(file_auth.session_ttl_days)
            .unwrap_or(DEFAULT_SESSION_TTL_DAYS);
        let secure_cookie = cli
            .secure_cookie
            .or(file_auth.secure_cookie)
            .unwrap_or(false);
        let jwt_secret = env_secret
            .or(file_auth.jwt_secret)
            .filter(|s| !s.trim().is_empty());

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| file_database.path.map(|p| expand_path(&p)));

        Self {
            server: ServerConfig { host, port },
            cors: CorsConfig { frontend_origin },
            auth: AuthConfig {
                session_ttl_days,
                secure_cookie,
                jwt_secret,
            },
            database: DatabaseConfig {
                path: database_path,
            },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.auth.session_ttl_days == 0 {
            anyhow::bail!("Configuration error: auth.session_ttl_days must be greater than 0");
        }
        if self.cors.frontend_origin.parse::<axum::http::HeaderValue>().is_err() {
            anyhow::bail!(
                "Configuration error: cors.frontend_origin '{}' is not a valid origin",
                self.cors.frontend_origin
            );
        }
        Ok(())
    }
}

/// Get the profile config path (~/.leads/leads.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 9090 },
            "cors": { "frontend_origin": "https://app.example.com" },
            "auth": { "session_ttl_days": 14, "secure_cookie": true },
            "database": { "path": "/tmp/leads.db" }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(9090));
        assert_eq!(
            config.cors.as_ref().unwrap().frontend_origin.as_deref(),
            Some("https://app.example.com")
        );
        let auth = config.auth.as_ref().unwrap();
        assert_eq!(auth.session_ttl_days, Some(14));
        assert_eq!(auth.secure_cookie, Some(true));
        assert_eq!(
            config.database.as_ref().unwrap().path.as_deref(),
            Some("/tmp/leads.db")
        );
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "server": { "host": "base", "port": 1000 }, "auth": { "session_ttl_days": 3 } }"#,
        )
        .unwrap();
        let overlay: FileConfig =
            serde_json::from_str(r#"{ "server": { "port": 2000 }, "auth": { "secure_cookie": true } }"#)
                .unwrap();
        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("base"));
        assert_eq!(server.port, Some(2000));
        let auth = base.auth.unwrap();
        assert_eq!(auth.session_ttl_days, Some(3));
        assert_eq!(auth.secure_cookie, Some(true));
    }

    #[test]
    fn test_layer_defaults() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default(), None);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.cors.frontend_origin, DEFAULT_FRONTEND_ORIGIN);
        assert_eq!(config.auth.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
        assert!(!config.auth.secure_cookie);
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.database.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layer_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 1000 }, "auth": { "secure_cookie": false, "jwt_secret": "file" } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(3000),
            secure_cookie: Some(true),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, file, Some("env".to_string()));
        assert_eq!(config.server.port, 3000);
        assert!(config.auth.secure_cookie);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("env"));
    }

    #[test]
    fn test_layer_blank_secret_ignored() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default(), Some("  ".into()));
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, FileConfig::default(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let cli = CliConfig {
            session_ttl_days: Some(0),
            ..Default::default()
        };
        let config = AppConfig::layer(&cli, FileConfig::default(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default(), Some("s3cr3t".into()));
        let debug = format!("{:?}", config.auth);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("REDACTED"));
    }
}
