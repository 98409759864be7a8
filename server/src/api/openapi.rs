//! OpenAPI specification

use axum::response::Json;
use utoipa::OpenApi;

use crate::api::routes::{auth, health, leads};
use crate::api::types::ErrorBody;
use crate::data::types::{LeadSource, LeadStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leads API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Lead management with filterable, paginated listing"
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and cookie sessions"),
        (name = "leads", description = "Owner-scoped lead records")
    ),
    paths(
        health::root,
        health::health,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        leads::list_leads,
        leads::create_lead,
        leads::get_lead,
        leads::update_lead,
        leads::delete_lead,
    ),
    components(schemas(
        ErrorBody,
        health::RootResponse,
        health::HealthResponse,
        auth::CredentialsRequest,
        auth::UserResponse,
        LeadSource,
        LeadStatus,
        leads::types::LeadDto,
        leads::types::CreateLeadRequest,
        leads::types::UpdateLeadRequest,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
