//! API server and routes
//!
//! - `auth` - session tokens, password hashing, `require_auth`
//! - `routes` - health, auth and lead handlers
//! - `types` - error responses and pagination

pub mod auth;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
mod server;
pub mod types;

pub use auth::AuthManager;
pub use server::{ApiServer, build_router};
