//! Shared API types
//!
//! Error responses and pagination used across all endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::constants::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::data::DataError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Unauthorized { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Conflicts surface as 409 with the storage message; everything else is
    /// logged and reported as a generic 500.
    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::Conflict(message) => Self::conflict("CONFLICT", message),
            e => {
                tracing::error!(error = %e, "Data error");
                Self::Internal {
                    message: "Database operation failed".to_string(),
                }
            }
        }
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        Self::from_data(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", code, message)
            }
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Error body shape, for the OpenAPI document
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error kind (`bad_request`, `not_found`, ...)
    pub error: String,
    pub code: String,
    pub message: String,
}

// =============================================================================
// Pagination
// =============================================================================

/// Page window taken from raw list-query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// `page` floored at 1; `limit` floored at 1 and capped at the maximum.
    /// Values without a leading integer fall back to the defaults.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|v| parse_leading_int(v))
            .unwrap_or(DEFAULT_PAGE as i64);
        let limit = params
            .get("limit")
            .and_then(|v| parse_leading_int(v))
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64);

        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            limit: limit.clamp(1, MAX_PAGE_LIMIT as i64) as u32,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Integer prefix of `s` (`"12abc"` is 12), like a lenient `parseInt`
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs instead of rejecting them
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: total.div_ceil(pagination.limit as u64).max(1),
        }
    }
}
