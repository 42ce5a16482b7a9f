use axum::{Router, extract::State, http::StatusCode, routing::get};
use db::models::{
    customer::{Customer, UpdateCustomer},
    project::Project,
};
use serde::Serialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::reject_blank;
use crate::{
    error::ApiError,
    extractors::{AdminClaims, Json, Path},
    state::AppState,
};

#[derive(Debug, Serialize, TS)]
pub struct CustomerWithProjects {
    #[serde(flatten)]
    #[ts(flatten)]
    pub customer: Customer,
    pub projects: Vec<Project>,
}

/// GET /api/customers (newest first)
pub async fn list_customers(
    _admin: AdminClaims,
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(Customer::find_all(&state.db().pool).await?))
}

pub async fn get_customer(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerWithProjects>, ApiError> {
    let pool = &state.db().pool;
    let customer = Customer::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound("Customer"))?;
    let projects = Project::find_by_customer_id(pool, id).await?;
    Ok(Json(CustomerWithProjects { customer, projects }))
}

pub async fn update_customer(
    _admin: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomer>,
) -> Result<Json<Customer>, ApiError> {
    reject_blank(&[
        ("name", payload.name.as_ref()),
        ("email", payload.email.as_ref()),
        ("phone", payload.phone.as_ref()),
        ("address", payload.address.as_ref()),
        ("city", payload.city.as_ref()),
        ("state", payload.state.as_ref()),
        ("zip_code", payload.zip_code.as_ref()),
    ])?;
    let customer = Customer::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Customer"))?;
    Ok(Json(customer))
}

/// Removes the customer together with their projects and everything hanging off them.
pub async fn delete_customer(
    AdminClaims(admin): AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if Customer::delete(&state.db().pool, id).await? == 0 {
        return Err(ApiError::NotFound("Customer"));
    }
    info!(customer_id = %id, admin = %admin.sub, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/customers",
        Router::new().route("/", get(list_customers)).route(
            "/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        ),
    )
}
