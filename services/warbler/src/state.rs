//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::AppConfig,
    repositories::{MessageRepository, UserRepository},
    session::SessionKeys,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub message_repository: MessageRepository,
    pub session_keys: Arc<SessionKeys>,
}

impl AppState {
    /// Wire repositories and session keys around a pool
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            message_repository: MessageRepository::new(pool.clone()),
            session_keys: Arc::new(SessionKeys::new(
                &config.secret_key,
                config.session_ttl_secs,
            )),
            db_pool: pool,
        }
    }
}
