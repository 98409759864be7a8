//! TransactionalRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::Predicate;
use crate::data::traits::TransactionalRepository;
use crate::data::types::{LeadChanges, LeadRow, NewLead, UserRow};

use super::SqliteService;
use super::repositories::{lead, user};

#[async_trait]
impl TransactionalRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), email, password_hash)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_email(self.pool(), email)
            .await
            .map_err(Into::into)
    }

    // ==================== Lead Operations ====================

    async fn create_lead(&self, owner: &str, new_lead: &NewLead) -> Result<LeadRow, DataError> {
        lead::create_lead(self.pool(), owner, new_lead)
            .await
            .map_err(Into::into)
    }

    async fn get_lead(&self, owner: &str, id: &str) -> Result<Option<LeadRow>, DataError> {
        lead::get_lead(self.pool(), owner, id)
            .await
            .map_err(Into::into)
    }

    async fn update_lead(
        &self,
        owner: &str,
        id: &str,
        changes: &LeadChanges,
    ) -> Result<Option<LeadRow>, DataError> {
        lead::update_lead(self.pool(), owner, id, changes)
            .await
            .map_err(Into::into)
    }

    async fn delete_lead(&self, owner: &str, id: &str) -> Result<bool, DataError> {
        lead::delete_lead(self.pool(), owner, id)
            .await
            .map_err(Into::into)
    }

    async fn find_leads(
        &self,
        predicate: &Predicate,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LeadRow>, DataError> {
        lead::find_leads(self.pool(), predicate, offset, limit)
            .await
            .map_err(Into::into)
    }

    async fn count_leads(&self, predicate: &Predicate) -> Result<u64, DataError> {
        lead::count_leads(self.pool(), predicate)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::data::filters::build_lead_filter;
    use crate::data::types::{LeadSource, LeadStatus};

    async fn repo() -> Arc<SqliteService> {
        Arc::new(SqliteService::in_memory().await)
    }

    #[tokio::test]
    async fn test_duplicate_lead_maps_to_data_conflict() {
        let repo = repo().await;
        let owner = repo.create_user("o@example.com", "hash").await.unwrap();
        let lead = NewLead {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@example.com".into(),
            phone: None,
            company: None,
            city: None,
            state: None,
            source: LeadSource::Referral,
            status: LeadStatus::Contacted,
            score: 10,
            lead_value: 0.0,
            last_activity_at: None,
            is_qualified: false,
        };
        repo.create_lead(&owner.id, &lead).await.unwrap();

        let err = repo.create_lead(&owner.id, &lead).await.unwrap_err();
        assert!(matches!(err, DataError::Conflict(_)));

        let predicate = build_lead_filter(&HashMap::new(), &owner.id);
        assert_eq!(repo.count_leads(&predicate).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_maps_to_data_conflict() {
        let repo = repo().await;
        repo.create_user("o@example.com", "hash").await.unwrap();
        let err = repo.create_user("o@example.com", "hash").await.unwrap_err();
        assert!(matches!(err, DataError::Conflict(_)));
    }
}
