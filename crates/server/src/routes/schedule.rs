use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use db::models::schedule_event::{
    CreateScheduleEvent, ScheduleEvent, ScheduleEventWithProject, ScheduleFilter,
    UpdateScheduleEvent,
};
use serde::Deserialize;
use services::services::{calendar::CalendarDay, schedule::ScheduleService};
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json, Path, Query},
    state::AppState,
};

/// PATCH body: the event id travels alongside the fields being changed.
#[derive(Debug, Deserialize, TS)]
pub struct PatchScheduleEvent {
    pub id: Uuid,
    #[serde(flatten)]
    #[ts(flatten)]
    pub changes: UpdateScheduleEvent,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

fn service(state: &AppState) -> ScheduleService {
    ScheduleService::new(state.db().pool.clone())
}

/// GET /api/schedule?status=&type=
pub async fn list_events(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<Vec<ScheduleEventWithProject>>, ApiError> {
    Ok(Json(service(&state).list(&filter).await?))
}

/// POST /api/schedule
pub async fn create_event(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<CreateScheduleEvent>,
) -> Result<(StatusCode, Json<ScheduleEvent>), ApiError> {
    let event = service(&state).create(payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/schedule/bulk
pub async fn import_events(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<Vec<CreateScheduleEvent>>,
) -> Result<(StatusCode, Json<Vec<ScheduleEvent>>), ApiError> {
    let events = service(&state).create_many(payload).await?;
    Ok((StatusCode::CREATED, Json(events)))
}

/// PATCH /api/schedule
pub async fn update_event(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<PatchScheduleEvent>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    Ok(Json(service(&state).update(payload.id, payload.changes).await?))
}

pub async fn get_event(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    Ok(Json(service(&state).get(id).await?))
}

/// DELETE /api/schedule/{id}
pub async fn delete_event(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/schedule/calendar?year=&month=
pub async fn calendar(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDay<ScheduleEventWithProject>>>, ApiError> {
    Ok(Json(
        service(&state)
            .calendar_month(query.year, query.month)
            .await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/schedule",
        Router::new()
            .route("/", get(list_events).post(create_event).patch(update_event))
            .route("/bulk", post(import_events))
            .route("/calendar", get(calendar))
            .route("/{id}", get(get_event).delete(delete_event)),
    )
}
