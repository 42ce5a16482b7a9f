use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::customer::Customer;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Lead,
    Quoted,
    Approved,
    InProgress,
    Completed,
    Cancelled,
    ProposalCreated,
    ProposalSent,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "project_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A single customer job.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub customer_id: Uuid, // Foreign key to Customer
    pub project_name: String,
    pub project_type: String,
    pub description: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub priority: ProjectPriority,
    pub lead_source: Option<String>,
    pub status: ProjectStatus,
    pub meeting_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project joined with the display fields of its customer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProjectWithCustomer {
    #[serde(flatten)]
    #[sqlx(flatten)]
    #[ts(flatten)]
    pub project: Project,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
}

impl std::ops::Deref for ProjectWithCustomer {
    type Target = Project;
    fn deref(&self) -> &Self::Target {
        &self.project
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub customer_id: Uuid,
    pub project_name: String,
    pub project_type: String,
    pub description: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub priority: Option<ProjectPriority>,
    pub lead_source: Option<String>,
    pub status: Option<ProjectStatus>,
    pub meeting_notes: Option<String>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProject {
    pub project_name: Option<String>,
    pub project_type: Option<String>,
    pub description: Option<String>,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub priority: Option<ProjectPriority>,
    pub lead_source: Option<String>,
    pub status: Option<ProjectStatus>,
    pub meeting_notes: Option<String>,
    pub internal_notes: Option<String>,
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Project {
    pub async fn parent_customer(&self, pool: &SqlitePool) -> Result<Option<Customer>, sqlx::Error> {
        Customer::find_by_id(pool, self.customer_id).await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, customer_id, project_name, project_type, description, budget_range, timeline, priority, lead_source, status, meeting_notes, internal_notes, created_at, updated_at
               FROM projects
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_customer_id(
        pool: &SqlitePool,
        customer_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, customer_id, project_name, project_type, description, budget_range, timeline, priority, lead_source, status, meeting_notes, internal_notes, created_at, updated_at
               FROM projects
               WHERE customer_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await
    }

    /// Admin project list, newest first, optionally restricted to one status.
    pub async fn find_all_with_customer(
        pool: &SqlitePool,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ProjectWithCustomer>, sqlx::Error> {
        sqlx::query_as::<_, ProjectWithCustomer>(
            r#"SELECT
                 p.id, p.customer_id, p.project_name, p.project_type, p.description, p.budget_range,
                 p.timeline, p.priority, p.lead_source, p.status, p.meeting_notes, p.internal_notes,
                 p.created_at, p.updated_at,
                 c.name    AS customer_name,
                 c.email   AS customer_email,
                 c.address AS customer_address
               FROM projects p
               JOIN customers c ON c.id = p.customer_id
               WHERE $1 IS NULL OR p.status = $1
               ORDER BY p.created_at DESC"#,
        )
        .bind(status)
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateProject,
        project_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let status = data.status.unwrap_or_default();
        let priority = data.priority.unwrap_or_default();
        sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects (id, customer_id, project_name, project_type, description, budget_range, timeline, priority, lead_source, status, meeting_notes, internal_notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id, customer_id, project_name, project_type, description, budget_range, timeline, priority, lead_source, status, meeting_notes, internal_notes, created_at, updated_at"#,
        )
        .bind(project_id)
        .bind(data.customer_id)
        .bind(data.project_name.trim())
        .bind(data.project_type.trim())
        .bind(data.description.trim())
        .bind(blank_to_none(&data.budget_range))
        .bind(blank_to_none(&data.timeline))
        .bind(priority)
        .bind(blank_to_none(&data.lead_source))
        .bind(status)
        .bind(blank_to_none(&data.meeting_notes))
        .bind(blank_to_none(&data.internal_notes))
        .fetch_one(executor)
        .await
    }

    /// Absent fields are kept. Optional text fields sent as `""` are cleared.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"UPDATE projects
               SET project_name = COALESCE($2, project_name),
                   project_type = COALESCE($3, project_type),
                   description = COALESCE($4, description),
                   budget_range = CASE WHEN $5 IS NULL THEN budget_range ELSE NULLIF(TRIM($5), '') END,
                   timeline = CASE WHEN $6 IS NULL THEN timeline ELSE NULLIF(TRIM($6), '') END,
                   priority = COALESCE($7, priority),
                   lead_source = CASE WHEN $8 IS NULL THEN lead_source ELSE NULLIF(TRIM($8), '') END,
                   status = COALESCE($9, status),
                   meeting_notes = CASE WHEN $10 IS NULL THEN meeting_notes ELSE NULLIF(TRIM($10), '') END,
                   internal_notes = CASE WHEN $11 IS NULL THEN internal_notes ELSE NULLIF(TRIM($11), '') END,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, customer_id, project_name, project_type, description, budget_range, timeline, priority, lead_source, status, meeting_notes, internal_notes, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.project_name)
        .bind(&data.project_type)
        .bind(&data.description)
        .bind(&data.budget_range)
        .bind(&data.timeline)
        .bind(data.priority)
        .bind(&data.lead_source)
        .bind(data.status)
        .bind(&data.meeting_notes)
        .bind(&data.internal_notes)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        Self::update(
            pool,
            id,
            &UpdateProject {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{DBService, models::fixtures};

    #[test]
    fn status_uses_snake_case_everywhere() {
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            ProjectStatus::from_str("proposal_sent").unwrap(),
            ProjectStatus::ProposalSent
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::ProposalCreated).unwrap(),
            "\"proposal_created\""
        );
    }

    #[tokio::test]
    async fn create_defaults_to_lead_and_medium_priority() {
        let db = DBService::new_in_memory().await.unwrap();
        let customer = fixtures::customer(&db.pool).await;
        let project = Project::create(&db.pool, &fixtures::create_project(customer.id), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(project.status, ProjectStatus::Lead);
        assert_eq!(project.priority, ProjectPriority::Medium);
        assert_eq!(project.budget_range, None);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_joins_customer() {
        let db = DBService::new_in_memory().await.unwrap();
        let customer = fixtures::customer(&db.pool).await;
        let lead = Project::create(&db.pool, &fixtures::create_project(customer.id), Uuid::new_v4())
            .await
            .unwrap();
        let quoted = Project::create(&db.pool, &fixtures::create_project(customer.id), Uuid::new_v4())
            .await
            .unwrap();
        Project::update_status(&db.pool, quoted.id, ProjectStatus::Quoted)
            .await
            .unwrap();

        let all = Project::find_all_with_customer(&db.pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| p.customer_name == customer.name));

        let leads = Project::find_all_with_customer(&db.pool, Some(ProjectStatus::Lead))
            .await
            .unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, lead.id);
    }

    #[tokio::test]
    async fn deleting_customer_cascades_to_projects() {
        let db = DBService::new_in_memory().await.unwrap();
        let customer = fixtures::customer(&db.pool).await;
        let project = Project::create(&db.pool, &fixtures::create_project(customer.id), Uuid::new_v4())
            .await
            .unwrap();

        Customer::delete(&db.pool, customer.id).await.unwrap();

        assert!(Project::find_by_id(&db.pool, project.id).await.unwrap().is_none());
    }
}
