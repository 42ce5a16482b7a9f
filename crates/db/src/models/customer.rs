use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub secondary_phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub secondary_phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub secondary_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl Customer {
    /// Street, city, state and zip on one line, as used for event locations.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"SELECT id, name, email, phone, secondary_phone, address, city, state, zip_code, created_at, updated_at
               FROM customers
               ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Customer>(
            r#"SELECT id, name, email, phone, secondary_phone, address, city, state, zip_code, created_at, updated_at
               FROM customers
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateCustomer,
        customer_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Customer>(
            r#"INSERT INTO customers (id, name, email, phone, secondary_phone, address, city, state, zip_code)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id, name, email, phone, secondary_phone, address, city, state, zip_code, created_at, updated_at"#,
        )
        .bind(customer_id)
        .bind(data.name.trim())
        .bind(data.email.trim())
        .bind(data.phone.trim())
        .bind(
            data.secondary_phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        )
        .bind(data.address.trim())
        .bind(data.city.trim())
        .bind(data.state.trim())
        .bind(data.zip_code.trim())
        .fetch_one(executor)
        .await
    }

    /// Overwrites only the fields present in `data`. An empty `secondary_phone` clears it.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCustomer,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"UPDATE customers
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   secondary_phone = CASE WHEN $5 IS NULL THEN secondary_phone ELSE NULLIF(TRIM($5), '') END,
                   address = COALESCE($6, address),
                   city = COALESCE($7, city),
                   state = COALESCE($8, state),
                   zip_code = COALESCE($9, zip_code),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, name, email, phone, secondary_phone, address, city, state, zip_code, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.secondary_phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.zip_code)
        .fetch_optional(pool)
        .await
    }

    /// Deleting a customer cascades to its projects and everything hanging off them.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn sample() -> CreateCustomer {
        CreateCustomer {
            name: "Ada Builder".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            secondary_phone: Some("  ".to_string()),
            address: " 12 Oak St ".to_string(),
            city: "Bend".to_string(),
            state: "OR".to_string(),
            zip_code: "97701".to_string(),
        }
    }

    #[tokio::test]
    async fn create_trims_fields_and_drops_blank_secondary_phone() {
        let db = DBService::new_in_memory().await.unwrap();
        let customer = Customer::create(&db.pool, &sample(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(customer.address, "12 Oak St");
        assert_eq!(customer.secondary_phone, None);
        assert_eq!(customer.full_address(), "12 Oak St, Bend, OR 97701");
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        let customer = Customer::create(&db.pool, &sample(), Uuid::new_v4())
            .await
            .unwrap();

        let updated = Customer::update(
            &db.pool,
            customer.id,
            &UpdateCustomer {
                phone: Some("555-0199".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.name, customer.name);
        assert!(
            Customer::update(&db.pool, Uuid::new_v4(), &UpdateCustomer::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
