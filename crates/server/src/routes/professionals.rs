use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use db::models::professional::{CreateProfessional, Professional, UpdateProfessional};
use serde::Deserialize;
use uuid::Uuid;

use super::reject_blank;
use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json, Path, Query},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProfessionalQuery {
    pub active: Option<bool>,
}

/// GET /api/professionals?active=
pub async fn list_professionals(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Query(query): Query<ProfessionalQuery>,
) -> Result<Json<Vec<Professional>>, ApiError> {
    Ok(Json(
        Professional::find_all(&state.db().pool, query.active).await?,
    ))
}

pub async fn create_professional(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<CreateProfessional>,
) -> Result<(StatusCode, Json<Professional>), ApiError> {
    let mut problems = Vec::new();
    if payload.name.trim().is_empty() {
        problems.push("name is required".to_string());
    }
    if payload.trade.trim().is_empty() {
        problems.push("trade is required".to_string());
    }
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let professional = Professional::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok((StatusCode::CREATED, Json(professional)))
}

pub async fn update_professional(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfessional>,
) -> Result<Json<Professional>, ApiError> {
    reject_blank(&[("name", payload.name.as_ref()), ("trade", payload.trade.as_ref())])?;
    let professional = Professional::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Professional"))?;
    Ok(Json(professional))
}

pub async fn delete_professional(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if Professional::delete(&state.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Professional"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/professionals",
            get(list_professionals).post(create_professional),
        )
        .route(
            "/professionals/{id}",
            patch(update_professional).delete(delete_professional),
        )
}
