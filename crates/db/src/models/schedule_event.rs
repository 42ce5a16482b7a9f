use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    SiteVisit,
    #[default]
    Meeting,
    Crew,
    Inspection,
    Delivery,
    Other,
}

/// Lifecycle of a calendar entry.
///
/// `Pending` is the initial state. An admin accepts or cancels a pending event, and an
/// accepted event is later completed (or cancelled). `Cancelled` and `Completed` are terminal.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pending,
    Accepted,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Cancelled | EventStatus::Completed)
    }

    /// Whether an admin may move an event from `self` to `next`. Re-setting the current
    /// status is always allowed; nothing leaves a terminal status.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        if self == next {
            return true;
        }
        !self.is_terminal()
            && matches!(
                (self, next),
                (Pending, Accepted) | (Pending, Cancelled) | (Accepted, Completed) | (Accepted, Cancelled)
            )
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ScheduleEvent {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    #[ts(type = "Array<string>")]
    pub attendees: Json<Vec<String>>,
    pub notes: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with the project and customer fields the calendar views display.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ScheduleEventWithProject {
    #[serde(flatten)]
    #[sqlx(flatten)]
    #[ts(flatten)]
    pub event: ScheduleEvent,
    pub project_name: String,
    pub customer_name: String,
    pub customer_address: String,
}

impl std::ops::Deref for ScheduleEventWithProject {
    type Target = ScheduleEvent;
    fn deref(&self) -> &Self::Target {
        &self.event
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateScheduleEvent {
    pub project_id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub notes: Option<String>,
    /// Defaults to `pending`; bulk imports may set any status.
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateScheduleEvent {
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub notes: Option<String>,
    pub status: Option<EventStatus>,
}

/// Optional filters for listing events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ScheduleFilter {
    pub status: Option<EventStatus>,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub event_type: Option<EventType>,
}

impl ScheduleEvent {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"SELECT id, project_id, title, event_type, start_time, end_time, location, attendees, notes, status, created_at, updated_at
               FROM schedule_events
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"SELECT id, project_id, title, event_type, start_time, end_time, location, attendees, notes, status, created_at, updated_at
               FROM schedule_events
               WHERE project_id = $1
               ORDER BY start_time ASC"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// All events matching `filter`, earliest start first.
    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &ScheduleFilter,
    ) -> Result<Vec<ScheduleEventWithProject>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEventWithProject>(
            r#"SELECT
                 e.id, e.project_id, e.title, e.event_type, e.start_time, e.end_time, e.location,
                 e.attendees, e.notes, e.status, e.created_at, e.updated_at,
                 p.project_name AS project_name,
                 c.name         AS customer_name,
                 c.address      AS customer_address
               FROM schedule_events e
               JOIN projects p  ON p.id = e.project_id
               JOIN customers c ON c.id = p.customer_id
               WHERE ($1 IS NULL OR e.status = $1)
                 AND ($2 IS NULL OR e.event_type = $2)
               ORDER BY e.start_time ASC"#,
        )
        .bind(filter.status)
        .bind(filter.event_type)
        .fetch_all(pool)
        .await
    }

    /// Events starting in `[from, to)`, earliest first.
    pub async fn find_in_range(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEventWithProject>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEventWithProject>(
            r#"SELECT
                 e.id, e.project_id, e.title, e.event_type, e.start_time, e.end_time, e.location,
                 e.attendees, e.notes, e.status, e.created_at, e.updated_at,
                 p.project_name AS project_name,
                 c.name         AS customer_name,
                 c.address      AS customer_address
               FROM schedule_events e
               JOIN projects p  ON p.id = e.project_id
               JOIN customers c ON c.id = p.customer_id
               WHERE e.start_time >= $1 AND e.start_time < $2
               ORDER BY e.start_time ASC"#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateScheduleEvent,
        event_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let status = data.status.unwrap_or_default();
        sqlx::query_as::<_, ScheduleEvent>(
            r#"INSERT INTO schedule_events (id, project_id, title, event_type, start_time, end_time, location, attendees, notes, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id, project_id, title, event_type, start_time, end_time, location, attendees, notes, status, created_at, updated_at"#,
        )
        .bind(event_id)
        .bind(data.project_id)
        .bind(data.title.trim())
        .bind(data.event_type)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.location)
        .bind(Json(&data.attendees))
        .bind(&data.notes)
        .bind(status)
        .fetch_one(executor)
        .await
    }

    /// Overwrites the supplied fields; an empty `location` or `notes` clears the column.
    /// Transition rules are the caller's concern.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateScheduleEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"UPDATE schedule_events
               SET title = COALESCE($2, title),
                   event_type = COALESCE($3, event_type),
                   start_time = COALESCE($4, start_time),
                   end_time = COALESCE($5, end_time),
                   location = CASE WHEN $6 IS NULL THEN location ELSE NULLIF(TRIM($6), '') END,
                   attendees = COALESCE($7, attendees),
                   notes = CASE WHEN $8 IS NULL THEN notes ELSE NULLIF(TRIM($8), '') END,
                   status = COALESCE($9, status),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, project_id, title, event_type, start_time, end_time, location, attendees, notes, status, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.event_type)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.location)
        .bind(data.attendees.as_ref().map(Json))
        .bind(&data.notes)
        .bind(data.status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedule_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedule_events")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::{DBService, models::fixtures};

    fn event_at(project_id: Uuid, hour: u32, event_type: EventType) -> CreateScheduleEvent {
        let start = Utc.with_ymd_and_hms(2026, 11, 3, hour, 0, 0).unwrap();
        CreateScheduleEvent {
            project_id,
            title: format!("{event_type} at {hour}"),
            event_type,
            start_time: start,
            end_time: start + Duration::hours(1),
            location: None,
            attendees: vec!["Ada".to_string()],
            notes: None,
            status: None,
        }
    }

    #[test]
    fn transition_graph() {
        use EventStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(Completed));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));

        assert!(Completed.is_terminal() && Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[tokio::test]
    async fn create_defaults_to_pending_and_keeps_attendees() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;

        let event = ScheduleEvent::create(&db.pool, &event_at(project.id, 9, EventType::SiteVisit), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.attendees.0, vec!["Ada".to_string()]);
        assert_eq!(event.end_time - event.start_time, Duration::hours(1));
    }

    #[tokio::test]
    async fn filtered_listing_is_ordered_by_start() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;

        for (hour, event_type) in [(15, EventType::Crew), (8, EventType::SiteVisit), (11, EventType::Crew)] {
            ScheduleEvent::create(&db.pool, &event_at(project.id, hour, event_type), Uuid::new_v4())
                .await
                .unwrap();
        }

        let crew = ScheduleEvent::find_filtered(
            &db.pool,
            &ScheduleFilter {
                event_type: Some(EventType::Crew),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let hours: Vec<_> = crew.iter().map(|e| e.start_time.format("%H").to_string()).collect();
        assert_eq!(hours, vec!["11", "15"]);
        assert!(crew.iter().all(|e| e.project_name == project.project_name));
    }

    #[tokio::test]
    async fn update_overwrites_only_supplied_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;
        let event = ScheduleEvent::create(&db.pool, &event_at(project.id, 9, EventType::Meeting), Uuid::new_v4())
            .await
            .unwrap();

        let updated = ScheduleEvent::update(
            &db.pool,
            event.id,
            &UpdateScheduleEvent {
                status: Some(EventStatus::Accepted),
                attendees: Some(vec!["Ada".to_string(), "Crew lead".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, EventStatus::Accepted);
        assert_eq!(updated.attendees.0.len(), 2);
        assert_eq!(updated.title, event.title);
        assert_eq!(updated.start_time, event.start_time);
    }

    #[tokio::test]
    async fn empty_optional_text_clears_the_column() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;
        let mut data = event_at(project.id, 9, EventType::Meeting);
        data.location = Some("1 St".to_string());
        data.notes = Some("bring ladder".to_string());
        let event = ScheduleEvent::create(&db.pool, &data, Uuid::new_v4()).await.unwrap();

        let updated = ScheduleEvent::update(
            &db.pool,
            event.id,
            &UpdateScheduleEvent {
                notes: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.notes, None);
        assert_eq!(updated.location.as_deref(), Some("1 St"));
    }
}
