//! Unified error type for data layer

use thiserror::Error;

/// Error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unique constraint violated (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DataError {
    /// Check if this error is transient (retry may succeed)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

/// Convert from the SQLite backend error
impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        match e {
            crate::data::sqlite::SqliteError::Database(e) => Self::Sqlite(e),
            crate::data::sqlite::SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "sqlite",
                version,
                name,
                error,
            },
            crate::data::sqlite::SqliteError::Io(e) => Self::Io(e),
            crate::data::sqlite::SqliteError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteError;

    #[test]
    fn test_conflict_passes_through() {
        let err: DataError = SqliteError::Conflict("Lead email must be unique".into()).into();
        assert!(matches!(err, DataError::Conflict(ref m) if m == "Lead email must be unique"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_migration_failed_names_backend() {
        let err: DataError = SqliteError::MigrationFailed {
            version: 1,
            name: "initial_schema".into(),
            error: "boom".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Migration 1 (initial_schema) failed on sqlite: boom"
        );
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let err: DataError = SqliteError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(err.is_transient());
    }
}
