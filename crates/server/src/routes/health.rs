use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use services::services::database_validator::DatabaseValidator;
use tracing::error;
use ts_rs::TS;

use crate::state::AppState;

#[derive(Debug, Serialize, TS)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_tables: Vec<String>,
}

/// 200 when the schema is complete, 503 otherwise. Never requires auth.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match DatabaseValidator::new(state.db().pool.clone()).validate().await {
        Ok(result) if result.is_ok() => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                missing_tables: Vec::new(),
            }),
        ),
        Ok(result) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
                database: "incomplete schema".to_string(),
                missing_tables: result.missing_tables,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "unreachable".to_string(),
                    missing_tables: Vec::new(),
                }),
            )
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
