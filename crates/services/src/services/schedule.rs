//! Service for schedule events and their status lifecycle.

use chrono::{DateTime, Utc};
use db::models::{
    project::Project,
    schedule_event::{
        CreateScheduleEvent, EventStatus, ScheduleEvent, ScheduleEventWithProject, ScheduleFilter,
        UpdateScheduleEvent,
    },
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::calendar::{self, CalendarDay, CalendarError};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("schedule event not found")]
    NotFound,
    #[error("project not found")]
    ProjectNotFound,
    #[error("cannot move event from {from} to {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub struct ScheduleService {
    pool: SqlitePool,
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ScheduleError> {
    if end < start {
        return Err(ScheduleError::Validation(
            "end_time must not be before start_time".to_string(),
        ));
    }
    Ok(())
}

impl ScheduleService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// New events start `pending` unless the caller sets a status explicitly.
    pub async fn create(&self, data: CreateScheduleEvent) -> Result<ScheduleEvent, ScheduleError> {
        if data.title.trim().is_empty() {
            return Err(ScheduleError::Validation("title is required".to_string()));
        }
        check_window(data.start_time, data.end_time)?;
        if Project::find_by_id(&self.pool, data.project_id).await?.is_none() {
            return Err(ScheduleError::ProjectNotFound);
        }

        let event = ScheduleEvent::create(&self.pool, &data, Uuid::new_v4()).await?;
        info!(
            event_id = %event.id,
            project_id = %event.project_id,
            event_type = %event.event_type,
            status = %event.status,
            "Schedule event created"
        );
        Ok(event)
    }

    /// Administrative import: every event is validated first, then all are inserted in one
    /// transaction with whatever status each one carries.
    pub async fn create_many(
        &self,
        items: Vec<CreateScheduleEvent>,
    ) -> Result<Vec<ScheduleEvent>, ScheduleError> {
        for (index, data) in items.iter().enumerate() {
            if data.title.trim().is_empty() {
                return Err(ScheduleError::Validation(format!("[{index}] title is required")));
            }
            check_window(data.start_time, data.end_time)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for data in &items {
            if Project::find_by_id(&mut *tx, data.project_id).await?.is_none() {
                tx.rollback().await?;
                return Err(ScheduleError::ProjectNotFound);
            }
            created.push(ScheduleEvent::create(&mut *tx, data, Uuid::new_v4()).await?);
        }
        tx.commit().await?;

        info!(count = created.len(), "Schedule events imported");
        Ok(created)
    }

    /// Overwrites the supplied fields. A status change must follow the lifecycle graph.
    pub async fn update(
        &self,
        id: Uuid,
        data: UpdateScheduleEvent,
    ) -> Result<ScheduleEvent, ScheduleError> {
        if data.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(ScheduleError::Validation("title cannot be blank".to_string()));
        }
        let current = ScheduleEvent::find_by_id(&self.pool, id)
            .await?
            .ok_or(ScheduleError::NotFound)?;

        if let Some(next) = data.status {
            if !current.status.can_transition_to(next) {
                return Err(ScheduleError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
        }
        check_window(
            data.start_time.unwrap_or(current.start_time),
            data.end_time.unwrap_or(current.end_time),
        )?;

        let updated = ScheduleEvent::update(&self.pool, id, &data)
            .await?
            .ok_or(ScheduleError::NotFound)?;

        if updated.status != current.status {
            info!(
                event_id = %id,
                from = %current.status,
                to = %updated.status,
                "Schedule event status changed"
            );
        }
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<ScheduleEvent, ScheduleError> {
        ScheduleEvent::find_by_id(&self.pool, id)
            .await?
            .ok_or(ScheduleError::NotFound)
    }

    pub async fn list(
        &self,
        filter: &ScheduleFilter,
    ) -> Result<Vec<ScheduleEventWithProject>, ScheduleError> {
        Ok(ScheduleEvent::find_filtered(&self.pool, filter).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ScheduleError> {
        if ScheduleEvent::delete(&self.pool, id).await? == 0 {
            return Err(ScheduleError::NotFound);
        }
        info!(event_id = %id, "Schedule event deleted");
        Ok(())
    }

    /// The month grid for `year`-`month` with every event placed on its start day.
    pub async fn calendar_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDay<ScheduleEventWithProject>>, ScheduleError> {
        let days = calendar::month_grid(year, month)?;
        let (from, to) = calendar::grid_bounds(&days)
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        let events = ScheduleEvent::find_in_range(&self.pool, from, to).await?;
        Ok(calendar::group_by_day(&days, month, events, |e| e.start_time))
    }
}
