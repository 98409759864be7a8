//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::openapi_json;
use super::routes::{auth, health, leads};
use crate::core::CoreApp;
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT};
use crate::data::TransactionalService;

pub struct ApiServer {
    app: CoreApp,
    auth_manager: Arc<AuthManager>,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let auth_manager = app.auth.clone();
        let allowed_origins = AllowedOrigins::new(&app.config.cors.frontend_origin);

        Self {
            app,
            auth_manager,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            auth_manager,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(auth_manager, app.database.clone(), &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "Leads API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Assemble the full HTTP router
pub fn build_router(
    auth_manager: Arc<AuthManager>,
    database: Arc<TransactionalService>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let auth_routes = auth::routes(auth_manager.clone(), database.clone())
        .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

    let leads_routes = leads::routes(database).route_layer(axum::middleware::from_fn_with_state(
        AuthState { auth_manager },
        require_auth,
    ));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi_json))
        .nest("/auth", auth_routes)
        .nest("/leads", leads_routes)
        .fallback(middleware::handle_404)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::debug_span!("http", method = %req.method(), path = %req.uri().path())
            }),
        )
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::core::{AuthConfig, KeySource, SigningKey};
    use crate::data::SqliteService;

    struct TestApp {
        router: Router,
        auth_manager: Arc<AuthManager>,
    }

    async fn test_app() -> TestApp {
        let database = Arc::new(TransactionalService::Sqlite(Arc::new(
            SqliteService::in_memory().await,
        )));
        let auth_manager = Arc::new(AuthManager::new(
            SigningKey {
                key: vec![42u8; 32],
                source: KeySource::Configured,
            },
            &AuthConfig {
                session_ttl_days: 7,
                secure_cookie: false,
                jwt_secret: None,
            },
        )
        .with_password_rounds(1_000));
        let router = build_router(
            auth_manager.clone(),
            database,
            &AllowedOrigins::new("http://localhost:5173"),
        );
        TestApp {
            router,
            auth_manager,
        }
    }

    impl TestApp {
        async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            self.router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap()
        }

        /// Register a user and return its `token=...` cookie pair
        async fn session(&self, email: &str) -> String {
            let response = self
                .send(
                    Method::POST,
                    "/auth/register",
                    None,
                    Some(json!({"email": email, "password": "pw"})),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            session_cookie(&response).unwrap()
        }

        async fn create_lead(&self, cookie: &str, body: Value) -> Value {
            let response = self.send(Method::POST, "/leads", Some(cookie), Some(body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
            body_json(response).await
        }
    }

    fn session_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("token="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn lead(first: &str, email: &str) -> Value {
        json!({
            "first_name": first,
            "last_name": "Tester",
            "email": email,
            "source": "website",
            "status": "new"
        })
    }

    #[tokio::test]
    async fn test_health_routes() {
        let app = test_app().await;

        let response = app.send(Method::GET, "/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"ok": true, "service": "Leads API"})
        );

        let response = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = test_app().await;
        let response = app.send(Method::GET, "/nope", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_register_login_me_logout() {
        let app = test_app().await;

        let response = app
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({"email": " Ada@Example.com ", "password": "pw"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Path=/"));
        let body = body_json(response).await;
        assert_eq!(body["email"], "ada@example.com");

        let response = app
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": "ada@example.com", "password": "pw"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response).unwrap();

        let response = app.send(Method::GET, "/auth/me", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["id"], body["id"]);
        assert_eq!(me["email"], "ada@example.com");

        let response = app.send(Method::POST, "/auth/logout", None, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(session_cookie(&response).as_deref(), Some("token="));
    }

    #[tokio::test]
    async fn test_register_errors() {
        let app = test_app().await;
        app.session("dup@example.com").await;

        let response = app
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({"email": "DUP@example.com", "password": "x"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .send(Method::POST, "/auth/register", None, Some(json!({"email": "a@b.c"})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = test_app().await;
        app.session("bob@example.com").await;

        for body in [
            json!({"email": "bob@example.com", "password": "wrong"}),
            json!({"email": "nobody@example.com", "password": "pw"}),
        ] {
            let response = app.send(Method::POST, "/auth/login", None, Some(body)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(response).await["message"], "invalid credentials");
        }

        let response = app
            .send(Method::POST, "/auth/login", None, Some(json!({"email": "", "password": ""})))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leads_require_session() {
        let app = test_app().await;

        let response = app.send(Method::GET, "/leads", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "AUTH_REQUIRED");

        let response = app
            .send(Method::GET, "/leads", Some("token=garbage"), None)
            .await;
        assert_eq!(body_json(response).await["code"], "TOKEN_INVALID");

        let response = app.send(Method::GET, "/auth/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let app = test_app().await;
        let mut claims = crate::api::auth::SessionClaims::new("u1", "a@example.com", 1);
        claims.iat -= 3 * 24 * 3600;
        claims.exp = claims.iat + 60;
        let jwt = crate::api::auth::jwt::sign_claims(&[42u8; 32], &claims).unwrap();

        let response = app
            .send(Method::GET, "/leads", Some(&format!("token={jwt}")), None)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn test_lead_crud_flow() {
        let app = test_app().await;
        let cookie = app.session("owner@example.com").await;

        let created = app.create_lead(&cookie, lead("Ada", "ada@acme.com")).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["score"], 0);
        assert_eq!(created["is_qualified"], false);

        let uri = format!("/leads/{id}");
        let response = app.send(Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .send(
                Method::PUT,
                &uri,
                Some(&cookie),
                Some(json!({"score": 75, "last_activity_at": "2024-03-15T10:00:00Z"})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["score"], 75);
        assert_eq!(updated["first_name"], "Ada");
        assert_eq!(updated["last_activity_at"], "2024-03-15T10:00:00Z");

        let response = app
            .send(Method::PUT, &uri, Some(&cookie), Some(json!({"last_activity_at": null})))
            .await;
        assert!(body_json(response).await["last_activity_at"].is_null());

        let response = app.send(Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.send(Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Lead not found");

        let response = app.send(Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lead_validation_and_conflict() {
        let app = test_app().await;
        let cookie = app.session("owner@example.com").await;
        app.create_lead(&cookie, lead("Ada", "ada@acme.com")).await;

        let response = app
            .send(Method::POST, "/leads", Some(&cookie), Some(lead("Eve", "ada@acme.com")))
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["message"],
            "Lead email must be unique"
        );

        let mut bad = lead("Eve", "eve@acme.com");
        bad["score"] = json!(101);
        let response = app.send(Method::POST, "/leads", Some(&cookie), Some(bad)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

        let mut bad = lead("Eve", "eve@acme.com");
        bad["source"] = json!("tv");
        let response = app.send(Method::POST, "/leads", Some(&cookie), Some(bad)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leads_are_owner_scoped() {
        let app = test_app().await;
        let alice = app.session("alice@example.com").await;
        let bob = app.session("bob@example.com").await;

        let created = app.create_lead(&alice, lead("Ada", "ada@acme.com")).await;
        let uri = format!("/leads/{}", created["id"].as_str().unwrap());

        let response = app.send(Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = app
            .send(Method::PUT, &uri, Some(&bob), Some(json!({"score": 1})))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = app.send(Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let alice_id = created["owner"].as_str().unwrap().to_string();
        let response = app
            .send(
                Method::GET,
                &format!("/leads?owner={alice_id}"),
                Some(&bob),
                None,
            )
            .await;
        let page = body_json(response).await;
        assert_eq!(page["total"], 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let app = test_app().await;
        let cookie = app.session("owner@example.com").await;

        for i in 0..5 {
            let mut body = lead(&format!("Lead{i}"), &format!("lead{i}@acme.com"));
            body["score"] = json!(i * 20);
            app.create_lead(&cookie, body).await;
        }
        app.create_lead(&cookie, lead("Other", "x@globex.com")).await;

        let response = app
            .send(Method::GET, "/leads?limit=2&page=2", Some(&cookie), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["total"], 6);
        assert_eq!(page["totalPages"], 3);
        assert_eq!(page["page"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);

        let response = app
            .send(
                Method::GET,
                "/leads?email_contains=ACME&score_gt=10&score_lt=70",
                Some(&cookie),
                None,
            )
            .await;
        let page = body_json(response).await;
        assert_eq!(page["total"], 3);
        let names: Vec<&str> = page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["first_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Lead3", "Lead2", "Lead1"]);

        let response = app
            .send(Method::GET, "/leads?score_gt=90&score_lt=10", Some(&cookie), None)
            .await;
        let page = body_json(response).await;
        assert_eq!(page["total"], 0);
        assert_eq!(page["totalPages"], 1);
    }

    #[tokio::test]
    async fn test_cors_allows_frontend_with_credentials() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/leads")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_session_from_manager_is_accepted() {
        let app = test_app().await;
        let jwt = app.auth_manager.issue_session("ghost", "g@example.com").unwrap();
        let response = app
            .send(Method::GET, "/auth/me", Some(&format!("token={jwt}")), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], "ghost");
    }
}
