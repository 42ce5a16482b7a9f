//! Row builders shared by the model tests.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{
    customer::{CreateCustomer, Customer},
    project::{CreateProject, Project},
};

pub(crate) fn create_customer() -> CreateCustomer {
    CreateCustomer {
        name: "Ada Builder".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
        secondary_phone: None,
        address: "12 Oak St".to_string(),
        city: "Bend".to_string(),
        state: "OR".to_string(),
        zip_code: "97701".to_string(),
    }
}

pub(crate) fn create_project(customer_id: Uuid) -> CreateProject {
    CreateProject {
        customer_id,
        project_name: "Back deck".to_string(),
        project_type: "Addition".to_string(),
        description: "New cedar deck".to_string(),
        budget_range: Some("  ".to_string()),
        timeline: None,
        priority: None,
        lead_source: None,
        status: None,
        meeting_notes: None,
        internal_notes: None,
    }
}

pub(crate) async fn customer(pool: &SqlitePool) -> Customer {
    Customer::create(pool, &create_customer(), Uuid::new_v4())
        .await
        .unwrap()
}

pub(crate) async fn project(pool: &SqlitePool) -> Project {
    let customer = customer(pool).await;
    Project::create(pool, &create_project(customer.id), Uuid::new_v4())
        .await
        .unwrap()
}
