// src/web/health_handlers.rs
use crate::{error::AppResult, state::AppState};
use axum::{extract::State, response::Json};
use serde_json::{json, Value};

/// GET /health - confirma que o servidor responde e que a DB está acessível.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    sqlx::query("SELECT 1").execute(&state.db_pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
