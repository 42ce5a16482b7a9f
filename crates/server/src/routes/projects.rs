use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use db::models::{
    customer::Customer,
    document::Document,
    project::{Project, ProjectStatus, ProjectWithCustomer, UpdateProject},
    schedule_event::ScheduleEvent,
};
use serde::{Deserialize, Serialize};
use services::services::auth::IssuedAccessCode;
use sqlx::SqlitePool;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::reject_blank;
use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json, Path, Query},
    state::AppState,
};

/// A project with everything the detail page and the customer portal show.
#[derive(Debug, Serialize, TS)]
pub struct ProjectDetail {
    pub project: Project,
    pub customer: Customer,
    pub documents: Vec<Document>,
    pub schedule_events: Vec<ScheduleEvent>,
}

impl ProjectDetail {
    pub async fn load(pool: &SqlitePool, id: Uuid) -> Result<Self, ApiError> {
        let project = Project::find_by_id(pool, id)
            .await?
            .ok_or(ApiError::NotFound("Project"))?;
        let customer = project
            .parent_customer(pool)
            .await?
            .ok_or(ApiError::NotFound("Customer"))?;
        let documents = Document::find_by_project_id(pool, id).await?;
        let schedule_events = ScheduleEvent::find_by_project_id(pool, id).await?;
        Ok(Self {
            project,
            customer,
            documents,
            schedule_events,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateProjectStatus {
    pub status: ProjectStatus,
}

/// GET /api/projects?status=
pub async fn list_projects(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<ProjectWithCustomer>>, ApiError> {
    Ok(Json(
        Project::find_all_with_customer(&state.db().pool, query.status).await?,
    ))
}

pub async fn get_project(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, ApiError> {
    Ok(Json(ProjectDetail::load(&state.db().pool, id).await?))
}

pub async fn update_project(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<Json<Project>, ApiError> {
    reject_blank(&[
        ("project_name", payload.project_name.as_ref()),
        ("project_type", payload.project_type.as_ref()),
        ("description", payload.description.as_ref()),
    ])?;
    let project = Project::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    Ok(Json(project))
}

/// PATCH /api/projects/{id}/status
pub async fn update_project_status(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectStatus>,
) -> Result<Json<Project>, ApiError> {
    let project = Project::update_status(&state.db().pool, id, payload.status)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    info!(project_id = %id, status = %project.status, "Project status updated");
    Ok(Json(project))
}

pub async fn delete_project(
    AdminClaims(admin): AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if Project::delete(&state.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Project"));
    }
    info!(project_id = %id, admin = %admin.sub, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/{id}/access-code
/// The plaintext code is only ever returned here.
pub async fn issue_access_code(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IssuedAccessCode>, ApiError> {
    Ok(Json(state.auth().generate_access_code(id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/projects",
        Router::new()
            .route("/", get(list_projects))
            .route(
                "/{id}",
                get(get_project).patch(update_project).delete(delete_project),
            )
            .route("/{id}/status", patch(update_project_status))
            .route("/{id}/access-code", post(issue_access_code)),
    )
}
