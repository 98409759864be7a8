//! Lead repository for SQLite operations
//!
//! Every statement carries `owner = ?`, so a lead of another user is
//! indistinguishable from a missing one.

use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

use crate::data::filters::{Predicate, SqlParams, SqlValue};
use crate::data::sqlite::SqliteError;
use crate::data::types::{LEAD_COLUMNS, LeadChanges, LeadRow, NewLead};
use crate::utils::time::now_millis;

/// Message carried by the conflict error on duplicate lead email
pub const DUPLICATE_LEAD_EMAIL: &str = "Lead email must be unique";

/// Bind compiled filter values in placeholder order
fn bind_values<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    values: &'q [SqlValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Real(n) => query.bind(*n),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Bool(b) => query.bind(*b),
        };
    }
    query
}

/// Insert a lead owned by `owner`
pub async fn create_lead(
    pool: &SqlitePool,
    owner: &str,
    lead: &NewLead,
) -> Result<LeadRow, SqliteError> {
    let now = now_millis();
    let row = LeadRow {
        id: cuid2::create_id(),
        owner: owner.to_string(),
        first_name: lead.first_name.clone(),
        last_name: lead.last_name.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        company: lead.company.clone(),
        city: lead.city.clone(),
        state: lead.state.clone(),
        source: lead.source,
        status: lead.status,
        score: lead.score,
        lead_value: lead.lead_value,
        last_activity_at: lead.last_activity_at,
        is_qualified: lead.is_qualified,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(&format!(
        "INSERT INTO leads ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        LEAD_COLUMNS
    ))
    .bind(&row.id)
    .bind(&row.owner)
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(&row.email)
    .bind(&row.phone)
    .bind(&row.company)
    .bind(&row.city)
    .bind(&row.state)
    .bind(row.source.as_str())
    .bind(row.status.as_str())
    .bind(row.score)
    .bind(row.lead_value)
    .bind(row.last_activity_at)
    .bind(row.is_qualified)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::unique_violation(e, DUPLICATE_LEAD_EMAIL))?;

    Ok(row)
}

/// Get a lead by ID within the owner's records
pub async fn get_lead(
    pool: &SqlitePool,
    owner: &str,
    id: &str,
) -> Result<Option<LeadRow>, SqliteError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {} FROM leads WHERE id = ? AND owner = ?",
        LEAD_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Apply a partial update. Returns `None` when the owner has no such lead.
pub async fn update_lead(
    pool: &SqlitePool,
    owner: &str,
    id: &str,
    changes: &LeadChanges,
) -> Result<Option<LeadRow>, SqliteError> {
    let mut tx = pool.begin().await?;

    let Some(mut row) = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {} FROM leads WHERE id = ? AND owner = ?",
        LEAD_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    if changes.is_empty() {
        return Ok(Some(row));
    }

    apply_changes(&mut row, changes);
    row.updated_at = now_millis().max(row.created_at);

    sqlx::query(
        r#"
        UPDATE leads SET
            first_name = ?, last_name = ?, email = ?, phone = ?, company = ?, city = ?,
            state = ?, source = ?, status = ?, score = ?, lead_value = ?,
            last_activity_at = ?, is_qualified = ?, updated_at = ?
        WHERE id = ? AND owner = ?
        "#,
    )
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(&row.email)
    .bind(&row.phone)
    .bind(&row.company)
    .bind(&row.city)
    .bind(&row.state)
    .bind(row.source.as_str())
    .bind(row.status.as_str())
    .bind(row.score)
    .bind(row.lead_value)
    .bind(row.last_activity_at)
    .bind(row.is_qualified)
    .bind(row.updated_at)
    .bind(id)
    .bind(owner)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::unique_violation(e, DUPLICATE_LEAD_EMAIL))?;

    tx.commit().await?;
    Ok(Some(row))
}

fn apply_changes(row: &mut LeadRow, changes: &LeadChanges) {
    let c = changes.clone();
    if let Some(v) = c.first_name {
        row.first_name = v;
    }
    if let Some(v) = c.last_name {
        row.last_name = v;
    }
    if let Some(v) = c.email {
        row.email = v;
    }
    if let Some(v) = c.phone {
        row.phone = v;
    }
    if let Some(v) = c.company {
        row.company = v;
    }
    if let Some(v) = c.city {
        row.city = v;
    }
    if let Some(v) = c.state {
        row.state = v;
    }
    if let Some(v) = c.source {
        row.source = v;
    }
    if let Some(v) = c.status {
        row.status = v;
    }
    if let Some(v) = c.score {
        row.score = v;
    }
    if let Some(v) = c.lead_value {
        row.lead_value = v;
    }
    if let Some(v) = c.last_activity_at {
        row.last_activity_at = v;
    }
    if let Some(v) = c.is_qualified {
        row.is_qualified = v;
    }
}

/// Delete a lead. Returns true if a row was removed.
pub async fn delete_lead(pool: &SqlitePool, owner: &str, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = ? AND owner = ?")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Leads matching `predicate`, newest first (ties: most recently inserted first)
pub async fn find_leads(
    pool: &SqlitePool,
    predicate: &Predicate,
    offset: u64,
    limit: u64,
) -> Result<Vec<LeadRow>, SqliteError> {
    let mut params = SqlParams::default();
    let where_clause = predicate.to_sql(&mut params);
    let sql = format!(
        "SELECT {} FROM leads WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        LEAD_COLUMNS, where_clause
    );

    let rows = bind_values(sqlx::query_as::<_, LeadRow>(&sql), &params.values)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Number of leads matching `predicate`
pub async fn count_leads(pool: &SqlitePool, predicate: &Predicate) -> Result<u64, SqliteError> {
    let mut params = SqlParams::default();
    let where_clause = predicate.to_sql(&mut params);
    let sql = format!("SELECT COUNT(*) FROM leads WHERE {}", where_clause);

    let count = bind_values(sqlx::query_as::<_, (i64,)>(&sql), &params.values)
        .fetch_one(pool)
        .await?;

    Ok(count.0.max(0) as u64)
}
