use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A subcontractor or vendor the office works with (electrician, plumber, supplier...).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Professional {
    pub id: Uuid,
    pub name: String,
    pub trade: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProfessional {
    pub name: String,
    pub trade: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProfessional {
    pub name: Option<String>,
    pub trade: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl Professional {
    pub async fn find_all(pool: &SqlitePool, active: Option<bool>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professional>(
            r#"SELECT id, name, trade, company, email, phone, notes, active, created_at, updated_at
               FROM professionals
               WHERE $1 IS NULL OR active = $1
               ORDER BY trade ASC, name ASC"#,
        )
        .bind(active)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professional>(
            r#"SELECT id, name, trade, company, email, phone, notes, active, created_at, updated_at
               FROM professionals
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProfessional,
        professional_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Professional>(
            r#"INSERT INTO professionals (id, name, trade, company, email, phone, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, name, trade, company, email, phone, notes, active, created_at, updated_at"#,
        )
        .bind(professional_id)
        .bind(data.name.trim())
        .bind(data.trade.trim())
        .bind(&data.company)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProfessional,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professional>(
            r#"UPDATE professionals
               SET name = COALESCE($2, name),
                   trade = COALESCE($3, trade),
                   company = CASE WHEN $4 IS NULL THEN company ELSE NULLIF(TRIM($4), '') END,
                   email = CASE WHEN $5 IS NULL THEN email ELSE NULLIF(TRIM($5), '') END,
                   phone = CASE WHEN $6 IS NULL THEN phone ELSE NULLIF(TRIM($6), '') END,
                   notes = CASE WHEN $7 IS NULL THEN notes ELSE NULLIF(TRIM($7), '') END,
                   active = COALESCE($8, active),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, name, trade, company, email, phone, notes, active, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.trade)
        .bind(&data.company)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.notes)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM professionals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
