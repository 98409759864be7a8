//! Health check endpoints

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::constants::SERVICE_NAME;

#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    pub ok: bool,
    pub service: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Service liveness
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        ok: true,
        service: SERVICE_NAME,
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
