//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl SqliteError {
    /// Map a unique-constraint violation to `Conflict(message)`, anything else
    /// to `Database`
    pub fn unique_violation(e: sqlx::Error, message: &str) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(message.to_string())
            }
            _ => Self::Database(e),
        }
    }
}
