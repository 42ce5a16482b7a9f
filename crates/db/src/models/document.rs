use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentType {
    IntakeForm,
    Proposal,
    Contract,
    ChangeOrder,
    Invoice,
    #[default]
    Other,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "signature_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignatureStatus {
    #[default]
    Pending,
    Sent,
    Signed,
    Declined,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Document {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub document_type: DocumentType,
    pub signature_status: SignatureStatus,
    pub file_url: Option<String>, // Set once the rendered file is uploaded
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDocument {
    pub project_id: Uuid,
    pub name: String,
    pub document_type: DocumentType,
    pub signature_status: Option<SignatureStatus>,
    pub file_url: Option<String>,
}

impl CreateDocument {
    /// The unsigned intake form every new job starts with.
    pub fn intake_form(project_id: Uuid) -> Self {
        Self {
            project_id,
            name: "Intake Form".to_string(),
            document_type: DocumentType::IntakeForm,
            signature_status: Some(SignatureStatus::Pending),
            file_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub signature_status: Option<SignatureStatus>,
    pub file_url: Option<String>,
}

impl Document {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"SELECT id, project_id, name, document_type, signature_status, file_url, created_at, updated_at
               FROM documents
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
        sqlx::query_as::<_, Document>(
            r#"SELECT id, project_id, name, document_type, signature_status, file_url, created_at, updated_at
               FROM documents
               WHERE project_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateDocument,
        document_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let signature_status = data.signature_status.unwrap_or_default();
        sqlx::query_as::<_, Document>(
            r#"INSERT INTO documents (id, project_id, name, document_type, signature_status, file_url)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, project_id, name, document_type, signature_status, file_url, created_at, updated_at"#,
        )
        .bind(document_id)
        .bind(data.project_id)
        .bind(data.name.trim())
        .bind(data.document_type)
        .bind(signature_status)
        .bind(&data.file_url)
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateDocument,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"UPDATE documents
               SET name = COALESCE($2, name),
                   signature_status = COALESCE($3, signature_status),
                   file_url = CASE WHEN $4 IS NULL THEN file_url ELSE NULLIF(TRIM($4), '') END,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, project_id, name, document_type, signature_status, file_url, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.signature_status)
        .bind(&data.file_url)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DBService, models::fixtures};

    #[tokio::test]
    async fn intake_form_starts_pending_without_file() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;

        let doc = Document::create(&db.pool, &CreateDocument::intake_form(project.id), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(doc.name, "Intake Form");
        assert_eq!(doc.document_type, DocumentType::IntakeForm);
        assert_eq!(doc.signature_status, SignatureStatus::Pending);
        assert!(doc.file_url.is_none());
    }

    #[tokio::test]
    async fn signing_sets_status_and_keeps_name() {
        let db = DBService::new_in_memory().await.unwrap();
        let project = fixtures::project(&db.pool).await;
        let doc = Document::create(&db.pool, &CreateDocument::intake_form(project.id), Uuid::new_v4())
            .await
            .unwrap();

        let signed = Document::update(
            &db.pool,
            doc.id,
            &UpdateDocument {
                signature_status: Some(SignatureStatus::Signed),
                file_url: Some("https://files.example.com/intake.pdf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(signed.signature_status, SignatureStatus::Signed);
        assert_eq!(signed.name, "Intake Form");
        assert_eq!(
            Document::find_by_project_id(&db.pool, project.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn insert_for_missing_project_violates_foreign_key() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = Document::create(
            &db.pool,
            &CreateDocument::intake_form(Uuid::new_v4()),
            Uuid::new_v4(),
        )
        .await;

        assert!(result.is_err());
    }
}
