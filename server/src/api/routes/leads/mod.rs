//! Lead API endpoints
//!
//! Every handler is scoped to the session owner: leads belonging to other
//! users are indistinguishable from missing ones.

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::{LeadPath, ValidatedJson};
use crate::api::types::{ApiError, ErrorBody, PaginatedResponse, Pagination};
use crate::data::TransactionalService;
use crate::data::filters::build_lead_filter;

use types::{CreateLeadRequest, LeadDto, UpdateLeadRequest};

fn lead_not_found() -> ApiError {
    ApiError::not_found("LEAD_NOT_FOUND", "Lead not found")
}

/// Shared state for Leads API endpoints
#[derive(Clone)]
pub struct LeadsApiState {
    pub database: Arc<TransactionalService>,
}

/// Build Leads API routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = LeadsApiState { database };

    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/{id}", get(get_lead).put(update_lead).delete(delete_lead))
        .with_state(state)
}

/// List the caller's leads with filters and pagination
///
/// Filter parameters follow `<field>[_<operator>]`; unknown names and
/// unparseable values are ignored.
#[utoipa::path(
    get,
    path = "/leads",
    tag = "leads",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-100)"),
        ("email" = Option<String>, Query, description = "Case-insensitive exact email"),
        ("email_contains" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("status_in" = Option<String>, Query, description = "Comma-separated statuses"),
        ("score_between" = Option<String>, Query, description = "Inclusive score range `a,b`"),
        ("created_at_on" = Option<String>, Query, description = "Calendar day in server-local time")
    ),
    responses(
        (status = 200, description = "Page of leads, newest first"),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_leads(
    State(state): State<LeadsApiState>,
    auth: Auth,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PaginatedResponse<LeadDto>>, ApiError> {
    let pagination = Pagination::from_query(&params);
    let predicate = build_lead_filter(&params, auth.user_id());
    tracing::debug!(filter = %predicate.to_document(), "Listing leads");

    let repo = state.database.repository();
    let total = repo.count_leads(&predicate).await?;
    let leads = repo
        .find_leads(&predicate, pagination.offset(), pagination.limit as u64)
        .await?;

    let data = leads.into_iter().map(LeadDto::from).collect();
    Ok(Json(PaginatedResponse::new(data, pagination, total)))
}

/// Create a lead owned by the caller
#[utoipa::path(
    post,
    path = "/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadDto),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Lead email must be unique", body = ErrorBody)
    )
)]
pub async fn create_lead(
    State(state): State<LeadsApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadDto>), ApiError> {
    let new_lead = body.into_new_lead()?;
    let lead = state
        .database
        .repository()
        .create_lead(auth.user_id(), &new_lead)
        .await?;

    tracing::debug!(lead_id = %lead.id, "Lead created");
    Ok((StatusCode::CREATED, Json(LeadDto::from(lead))))
}

/// Get a single lead by ID
#[utoipa::path(
    get,
    path = "/leads/{id}",
    tag = "leads",
    params(
        ("id" = String, Path, description = "Lead ID")
    ),
    responses(
        (status = 200, description = "Lead details", body = LeadDto),
        (status = 404, description = "Lead not found", body = ErrorBody)
    )
)]
pub async fn get_lead(
    State(state): State<LeadsApiState>,
    auth: Auth,
    path: LeadPath,
) -> Result<Json<LeadDto>, ApiError> {
    let lead = state
        .database
        .repository()
        .get_lead(auth.user_id(), &path.id)
        .await?
        .ok_or_else(lead_not_found)?;

    Ok(Json(LeadDto::from(lead)))
}

/// Partially update a lead
#[utoipa::path(
    put,
    path = "/leads/{id}",
    tag = "leads",
    params(
        ("id" = String, Path, description = "Lead ID")
    ),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Updated lead", body = LeadDto),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Lead not found", body = ErrorBody),
        (status = 409, description = "Lead email must be unique", body = ErrorBody)
    )
)]
pub async fn update_lead(
    State(state): State<LeadsApiState>,
    auth: Auth,
    path: LeadPath,
    ValidatedJson(body): ValidatedJson<UpdateLeadRequest>,
) -> Result<Json<LeadDto>, ApiError> {
    let changes = body.into_changes()?;
    let lead = state
        .database
        .repository()
        .update_lead(auth.user_id(), &path.id, &changes)
        .await?
        .ok_or_else(lead_not_found)?;

    Ok(Json(LeadDto::from(lead)))
}

/// Delete a lead
#[utoipa::path(
    delete,
    path = "/leads/{id}",
    tag = "leads",
    params(
        ("id" = String, Path, description = "Lead ID")
    ),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found", body = ErrorBody)
    )
)]
pub async fn delete_lead(
    State(state): State<LeadsApiState>,
    auth: Auth,
    path: LeadPath,
) -> Result<StatusCode, ApiError> {
    if !state
        .database
        .repository()
        .delete_lead(auth.user_id(), &path.id)
        .await?
    {
        return Err(lead_not_found());
    }

    tracing::debug!(lead_id = %path.id, "Lead deleted");
    Ok(StatusCode::NO_CONTENT)
}
