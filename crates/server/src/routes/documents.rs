use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use db::models::{
    document::{CreateDocument, Document, DocumentType, SignatureStatus, UpdateDocument},
    project::Project,
};
use serde::Deserialize;
use ts_rs::TS;
use uuid::Uuid;

use super::reject_blank;
use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json, Path},
    state::AppState,
};

/// POST body; the project comes from the path.
#[derive(Debug, Deserialize, TS)]
pub struct NewDocument {
    pub name: String,
    #[serde(default)]
    pub document_type: DocumentType,
    pub signature_status: Option<SignatureStatus>,
    pub file_url: Option<String>,
}

pub async fn list_documents(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(
        Document::find_by_project_id(&state.db().pool, project_id).await?,
    ))
}

pub async fn create_document(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<NewDocument>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(vec!["name is required".to_string()]));
    }
    let pool = &state.db().pool;
    if Project::find_by_id(pool, project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project"));
    }

    let data = CreateDocument {
        project_id,
        name: payload.name,
        document_type: payload.document_type,
        signature_status: payload.signature_status,
        file_url: payload.file_url,
    };
    let document = Document::create(pool, &data, Uuid::new_v4()).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// PATCH /api/documents/{id}: signature status, file url or name.
pub async fn update_document(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocument>,
) -> Result<Json<Document>, ApiError> {
    reject_blank(&[("name", payload.name.as_ref())])?;
    let document = Document::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Document"))?;
    Ok(Json(document))
}

pub async fn delete_document(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if Document::delete(&state.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Document"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/{id}/documents",
            get(list_documents).post(create_document),
        )
        .route("/documents/{id}", patch(update_document).delete(delete_document))
}
