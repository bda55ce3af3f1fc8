use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{Authenticator, SqliteTokenAuthenticator};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    /// State backed by bearer tokens stored alongside the users.
    pub fn new(db: SqlitePool) -> Self {
        let auth = Arc::new(SqliteTokenAuthenticator::new(db.clone()));
        Self { db, auth }
    }
}
