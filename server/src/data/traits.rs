//! Repository traits for database backends
//!
//! The HTTP layer talks to storage only through [`TransactionalRepository`],
//! so handlers never see SQL or a concrete pool.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::Predicate;
use crate::data::types::{LeadChanges, LeadRow, NewLead, UserRow};

/// Repository trait for transactional operations (users and leads)
///
/// Every lead operation is scoped to an owner; a lead belonging to another
/// user behaves as if it did not exist.
#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== User Operations ====================

    /// Create a new user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow, DataError>;

    /// Get a user by ID
    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError>;

    // ==================== Lead Operations ====================

    /// Insert a lead owned by `owner`. Fails with `Conflict` on duplicate email.
    async fn create_lead(&self, owner: &str, lead: &NewLead) -> Result<LeadRow, DataError>;

    /// Get a lead by ID within the owner's records
    async fn get_lead(&self, owner: &str, id: &str) -> Result<Option<LeadRow>, DataError>;

    /// Apply a partial update; `None` when the lead is not the owner's
    async fn update_lead(
        &self,
        owner: &str,
        id: &str,
        changes: &LeadChanges,
    ) -> Result<Option<LeadRow>, DataError>;

    /// Delete a lead; returns false when nothing matched
    async fn delete_lead(&self, owner: &str, id: &str) -> Result<bool, DataError>;

    /// Leads matching the predicate, newest first
    async fn find_leads(
        &self,
        predicate: &Predicate,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LeadRow>, DataError>;

    /// Number of leads matching the predicate
    async fn count_leads(&self, predicate: &Predicate) -> Result<u64, DataError>;
}
