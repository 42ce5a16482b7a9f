use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Email lookup is case-insensitive (the column is `COLLATE NOCASE`).
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AdminUser>(
            r#"SELECT id, email, name, password_hash, created_at
               FROM admin_users
               WHERE email = $1"#,
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await
    }

    /// `password_hash` must already be a one-way hash.
    pub async fn create(
        pool: &SqlitePool,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AdminUser>(
            r#"INSERT INTO admin_users (id, email, name, password_hash)
               VALUES ($1, $2, $3, $4)
               RETURNING id, email, name, password_hash, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(email.trim())
        .bind(name)
        .bind(password_hash)
        .fetch_one(pool)
        .await
    }
}
