use axum::{Router, extract::State, routing::get};

use super::projects::ProjectDetail;
use crate::{
    error::ApiError,
    extractors::{CustomerClaims, Json},
    state::AppState,
};

/// GET /api/portal/project
/// The customer only ever sees the project their token was issued for.
pub async fn my_project(
    customer: CustomerClaims,
    State(state): State<AppState>,
) -> Result<Json<ProjectDetail>, ApiError> {
    Ok(Json(
        ProjectDetail::load(&state.db().pool, customer.project_id).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/portal/project", get(my_project))
}
