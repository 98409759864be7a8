//! Authenticated caller identity

/// Identity of the session owner, injected by `require_auth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
