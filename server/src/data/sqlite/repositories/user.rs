//! User repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::UserRow;
use crate::utils::time::now_millis;

/// Message carried by the conflict error on duplicate registration
pub const DUPLICATE_USER_EMAIL: &str = "Email already registered";

type UserTuple = (String, String, String, i64, i64);

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

fn to_row((id, email, password_hash, created_at, updated_at): UserTuple) -> UserRow {
    UserRow {
        id,
        email,
        password_hash,
        created_at,
        updated_at,
    }
}

/// Create a new user with a generated CUID2 ID
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> Result<UserRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_millis();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::unique_violation(e, DUPLICATE_USER_EMAIL))?;

    Ok(UserRow {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_row))
}

/// Get a user by email
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_row))
}
