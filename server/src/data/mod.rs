//! Data storage layer
//!
//! - `sqlite` - Transactional database for users and leads
//! - `filters` - Lead list query parameters to predicate, predicate to SQL
//! - `types` - Row and input types shared by storage and API
//! - `traits` - Repository trait used by the HTTP layer
//! - `error` - Unified error type

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::TransactionalRepository;

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Transactional database service
///
/// Services are stored as Arc so background tasks and repositories can share
/// them with the shutdown path.
pub enum TransactionalService {
    /// SQLite backend (embedded)
    Sqlite(Arc<SqliteService>),
}

impl TransactionalService {
    /// Open the database at the configured location and run migrations
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &sqlx::SqlitePool {
        match self {
            Self::Sqlite(s) => s.pool(),
        }
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
        }
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => s.start_checkpoint_task(shutdown_rx),
        }
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn TransactionalRepository + Send + Sync> {
        match self {
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
        }
    }
}
