use axum::{Router, extract::State, routing::post};
use services::services::auth::{
    AdminLoginRequest, AdminSession, CustomerLoginRequest, CustomerSession,
};

use crate::{error::ApiError, extractors::Json, state::AppState};

/// POST /api/auth/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminSession>, ApiError> {
    Ok(Json(state.auth().login_admin(&payload).await?))
}

/// POST /api/auth/customer
pub async fn customer_login(
    State(state): State<AppState>,
    Json(payload): Json<CustomerLoginRequest>,
) -> Result<Json<CustomerSession>, ApiError> {
    Ok(Json(state.auth().login_customer(&payload).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/login", post(admin_login))
            .route("/customer", post(customer_login)),
    )
}
