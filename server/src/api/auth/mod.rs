//! Authentication module

mod context;
mod extractors;
pub mod jwt;
mod manager;
pub mod middleware;
pub mod password;

pub use context::AuthContext;
pub use extractors::Auth;
pub use jwt::{JwtError, SessionClaims};
pub use manager::AuthManager;
pub use middleware::{AuthError, AuthState, authenticate, require_auth};
