use std::sync::Arc;

use crate::db::Database;
use crate::token::TokenService;
use crate::user_auth::AuthenticationService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Signup / login / refresh
    pub auth: Arc<AuthenticationService>,
    /// Stateless access token validation
    pub tokens: Arc<TokenService>,
    /// PostgreSQL (None when running on the in-memory store)
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(auth: Arc<AuthenticationService>, pg_db: Option<Arc<Database>>) -> Self {
        Self {
            tokens: auth.tokens().clone(),
            auth,
            pg_db,
        }
    }
}
