//! Lead API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::ApiError;
use crate::data::types::{LeadChanges, LeadRow, LeadSource, LeadStatus, NewLead};
use crate::utils::time::{millis_to_datetime, parse_rfc3339_millis};

const INVALID_TIMESTAMP: &str = "last_activity_at must be an RFC 3339 timestamp";

/// Lead DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i64,
    pub lead_value: f64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub is_qualified: bool,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadDto {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            city: row.city,
            state: row.state,
            source: row.source,
            status: row.status,
            score: row.score,
            lead_value: row.lead_value,
            last_activity_at: row.last_activity_at.map(millis_to_datetime),
            is_qualified: row.is_qualified,
            owner: row.owner,
            created_at: millis_to_datetime(row.created_at),
            updated_at: millis_to_datetime(row.updated_at),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `null` and `""` both mean "no activity yet"
fn parse_activity(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(ts) => parse_rfc3339_millis(ts)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", INVALID_TIMESTAMP)),
    }
}

/// Request body for creating a lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,

    pub source: LeadSource,
    pub status: LeadStatus,

    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "score must be between 0 and 100"))]
    pub score: i64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "lead_value must be >= 0"))]
    pub lead_value: f64,

    /// RFC 3339 timestamp; `null` or `""` for none
    #[serde(default)]
    pub last_activity_at: Option<String>,

    #[serde(default)]
    pub is_qualified: bool,
}

impl CreateLeadRequest {
    pub fn into_new_lead(self) -> Result<NewLead, ApiError> {
        let last_activity_at = parse_activity(self.last_activity_at.as_deref())?;
        Ok(NewLead {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: self.source,
            status: self.status,
            score: self.score,
            lead_value: self.lead_value,
            last_activity_at,
            is_qualified: self.is_qualified,
        })
    }
}

/// Request body for updating a lead; omitted fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: Option<String>,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub state: Option<Option<String>>,

    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,

    #[validate(range(min = 0, max = 100, message = "score must be between 0 and 100"))]
    pub score: Option<i64>,

    #[validate(range(min = 0.0, message = "lead_value must be >= 0"))]
    pub lead_value: Option<f64>,

    /// RFC 3339 timestamp; `null` or `""` clears it
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub last_activity_at: Option<Option<String>>,

    pub is_qualified: Option<bool>,
}

impl UpdateLeadRequest {
    pub fn into_changes(self) -> Result<LeadChanges, ApiError> {
        let last_activity_at = match self.last_activity_at {
            None => None,
            Some(raw) => Some(parse_activity(raw.as_deref())?),
        };
        Ok(LeadChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: self.source,
            status: self.status,
            score: self.score,
            lead_value: self.lead_value,
            last_activity_at,
            is_qualified: self.is_qualified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "source": "website",
            "status": "new"
        })
    }

    #[test]
    fn test_create_defaults() {
        let req: CreateLeadRequest = serde_json::from_value(create_body()).unwrap();
        assert!(req.validate().is_ok());
        let lead = req.into_new_lead().unwrap();
        assert_eq!(lead.score, 0);
        assert_eq!(lead.lead_value, 0.0);
        assert_eq!(lead.last_activity_at, None);
        assert!(!lead.is_qualified);
    }

    #[test]
    fn test_create_activity_forms() {
        for (raw, expected) in [
            (json!(null), None),
            (json!(""), None),
            (json!("2024-01-01T00:00:00Z"), Some(1_704_067_200_000)),
        ] {
            let mut body = create_body();
            body["last_activity_at"] = raw;
            let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
            assert_eq!(req.into_new_lead().unwrap().last_activity_at, expected);
        }

        let mut body = create_body();
        body["last_activity_at"] = json!("last tuesday");
        let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
        assert!(req.into_new_lead().is_err());
    }

    #[test]
    fn test_create_validation_failures() {
        for (field, value) in [
            ("first_name", json!("")),
            ("email", json!("not-an-email")),
            ("score", json!(101)),
            ("score", json!(-1)),
            ("lead_value", json!(-0.5)),
        ] {
            let mut body = create_body();
            body[field] = value;
            let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
            assert!(req.validate().is_err(), "{field}");
        }
    }

    #[test]
    fn test_create_rejects_unknown_enum() {
        let mut body = create_body();
        body["status"] = json!("archived");
        assert!(serde_json::from_value::<CreateLeadRequest>(body).is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateLeadRequest =
            serde_json::from_value(json!({"phone": null, "last_activity_at": ""})).unwrap();
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.phone, Some(None));
        assert_eq!(changes.company, None);
        assert_eq!(changes.last_activity_at, Some(None));

        let req: UpdateLeadRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.into_changes().unwrap().is_empty());
    }

    #[test]
    fn test_update_validates_present_fields() {
        let req: UpdateLeadRequest = serde_json::from_value(json!({"score": 150})).unwrap();
        assert!(req.validate().is_err());
        let req: UpdateLeadRequest = serde_json::from_value(json!({"score": 50})).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_dto_timestamps_rfc3339() {
        let row = LeadRow {
            id: "l1".into(),
            owner: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: None,
            company: None,
            city: None,
            state: None,
            source: LeadSource::Referral,
            status: LeadStatus::Won,
            score: 10,
            lead_value: 5.5,
            last_activity_at: None,
            is_qualified: true,
            created_at: 1_704_067_200_000,
            updated_at: 1_704_067_200_000,
        };
        let json = serde_json::to_value(LeadDto::from(row)).unwrap();
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["source"], "referral");
        assert!(json["last_activity_at"].is_null());
    }
}
