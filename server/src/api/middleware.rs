//! HTTP middleware (CORS, 404 handler)

use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::core::constants::DEV_ORIGINS;

/// Browser origins allowed to call the API with credentials
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Dev-server origins plus the configured frontend origin
    pub fn new(frontend_origin: &str) -> Self {
        let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
        let frontend_origin = frontend_origin.trim().trim_end_matches('/');
        if !frontend_origin.is_empty() && !origins.iter().any(|o| o == frontend_origin) {
            origins.push(frontend_origin.to_string());
        }
        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// JSON 404 for unmatched routes
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404]");

    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "code": "NOT_FOUND",
            "message": format!("No route for {} {}", req.method(), req.uri().path()),
        })),
    )
}
