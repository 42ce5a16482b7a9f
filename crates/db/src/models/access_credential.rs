use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Hashed customer access code for one project. At most one per project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessCredential {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(skip)]
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AccessCredential {
    /// Stores `code_hash` for the project, replacing (and so invalidating) any previous code.
    pub async fn upsert(
        pool: &SqlitePool,
        project_id: Uuid,
        code_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AccessCredential>(
            r#"INSERT INTO access_credentials (id, project_id, code_hash)
               VALUES ($1, $2, $3)
               ON CONFLICT(project_id) DO UPDATE SET
                   code_hash = excluded.code_hash,
                   created_at = datetime('now', 'subsec')
               RETURNING id, project_id, code_hash, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(code_hash)
        .fetch_one(pool)
        .await
    }

    /// Credentials of every project whose customer lives at `address`, compared trimmed and
    /// case-insensitively.
    pub async fn find_by_customer_address(
        pool: &SqlitePool,
        address: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AccessCredential>(
            r#"SELECT ac.id, ac.project_id, ac.code_hash, ac.created_at
               FROM access_credentials ac
               JOIN projects p  ON p.id = ac.project_id
               JOIN customers c ON c.id = p.customer_id
               WHERE lower(trim(c.address)) = lower(trim($1))
               ORDER BY ac.created_at DESC"#,
        )
        .bind(address)
        .fetch_all(pool)
        .await
    }
}
