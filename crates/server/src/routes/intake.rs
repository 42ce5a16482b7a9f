use axum::{Router, extract::State, http::StatusCode, routing::post};
use services::services::intake::{IntakePipeline, IntakeRequest, IntakeResponse};
use tracing::info;

use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json},
    state::AppState,
};

/// POST /api/intake
/// Creates customer, project and intake form, plus a site visit when one was requested.
pub async fn submit_intake(
    AdminClaims(admin): AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<IntakeRequest>,
) -> Result<(StatusCode, Json<IntakeResponse>), ApiError> {
    let response = IntakePipeline::new(state.db().pool.clone())
        .submit(payload)
        .await?;
    info!(
        admin = %admin.sub,
        project_id = %response.project.id,
        meeting = response.schedule_event.is_some(),
        "Intake submitted"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/intake", post(submit_intake))
}
