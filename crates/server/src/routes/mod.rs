use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{error::ApiError, state::AppState};

pub mod auth;
pub mod customers;
pub mod documents;
pub mod health;
pub mod intake;
pub mod portal;
pub mod professionals;
pub mod projects;
pub mod schedule;

/// Partial updates may omit a required field but not blank it.
pub(crate) fn reject_blank(fields: &[(&str, Option<&String>)]) -> Result<(), ApiError> {
    let problems: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| format!("{name} cannot be blank"))
        .collect();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(problems))
    }
}

/// Every endpoint, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(intake::router())
        .merge(schedule::router())
        .merge(customers::router())
        .merge(projects::router())
        .merge(documents::router())
        .merge(professionals::router())
        .merge(portal::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
