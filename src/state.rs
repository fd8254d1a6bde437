// src/state.rs
use crate::{
    config::Config,
    error::{AppError, AppResult},
};
use axum::http::HeaderValue;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
    // Origem CORS já validada como cabeçalho
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> AppResult<Self> {
        let cors_origin = HeaderValue::from_str(&config.cors_origin).map_err(|e| {
            AppError::ConfigError(format!("CORS_ORIGIN inválido '{}': {}", config.cors_origin, e))
        })?;
        Ok(AppState {
            db_pool,
            config: Arc::new(config),
            cors_origin,
        })
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config.bcrypt_cost
    }
}

// Permite extrair o pool da DB diretamente
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}
