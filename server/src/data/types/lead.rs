//! Lead record types
//!
//! Timestamps are milliseconds since Unix epoch (UTC).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use thiserror::Error;
use utoipa::ToSchema;

/// Returned when a stored or submitted enum value is not a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Where a lead came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 6] = [
        Self::Website,
        Self::FacebookAds,
        Self::GoogleAds,
        Self::Referral,
        Self::Events,
        Self::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::FacebookAds => "facebook_ads",
            Self::GoogleAds => "google_ads",
            Self::Referral => "referral",
            Self::Events => "events",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "source",
                value: s.to_string(),
            })
    }
}

/// Pipeline stage of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Lost,
        Self::Won,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Lost => "lost",
            Self::Won => "won",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Lead row from database
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRow {
    pub id: String,
    pub owner: String,
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
    pub last_activity_at: Option<i64>,
    pub is_qualified: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Column list matching the `FromRow` impl below
pub const LEAD_COLUMNS: &str = "id, owner, first_name, last_name, email, phone, company, city, \
     state, source, status, score, lead_value, last_activity_at, is_qualified, created_at, updated_at";

fn decode_variant<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for LeadRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            company: row.try_get("company")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            source: decode_variant(row, "source")?,
            status: decode_variant(row, "status")?,
            score: row.try_get("score")?,
            lead_value: row.try_get("lead_value")?,
            last_activity_at: row.try_get("last_activity_at")?,
            is_qualified: row.try_get("is_qualified")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Validated input for creating a lead
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
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
    pub last_activity_at: Option<i64>,
    pub is_qualified: bool,
}

/// Partial update; `None` leaves the column untouched.
///
/// Nullable columns use `Option<Option<_>>` so that an explicit `null`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<i64>,
    pub lead_value: Option<f64>,
    pub last_activity_at: Option<Option<i64>>,
    pub is_qualified: Option<bool>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
