//! Schema check backing the health endpoint.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

/// Tables the portal cannot run without.
pub const REQUIRED_TABLES: &[&str] = &[
    "customers",
    "projects",
    "documents",
    "schedule_events",
    "professionals",
    "admin_users",
    "access_credentials",
];

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let migrations_applied = if self.table_exists("_sqlx_migrations").await? {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&self.pool)
                .await?
        } else {
            0
        };

        let missing_tables = self.missing_tables(REQUIRED_TABLES).await?;
        if missing_tables.is_empty() {
            debug!(migrations_applied, "Database schema OK");
        } else {
            warn!(?missing_tables, "Database schema incomplete");
        }

        Ok(ValidationResult {
            migrations_applied,
            missing_tables,
        })
    }

    pub async fn missing_tables(
        &self,
        required: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for table in required {
            if !self.table_exists(table).await? {
                missing.push((*table).to_string());
            }
        }
        Ok(missing)
    }

    async fn table_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ValidationResult {
    pub migrations_applied: i64,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.migrations_applied > 0 && self.missing_tables.is_empty()
    }
}
