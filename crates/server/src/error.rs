use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use services::services::{auth::AuthError, intake::IntakeError, schedule::ScheduleError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),
    #[error(transparent)]
    QueryString(#[from] QueryRejection),
    #[error(transparent)]
    PathParam(#[from] PathRejection),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn validation(problems: Vec<String>) -> (StatusCode, ErrorBody) {
    (
        StatusCode::BAD_REQUEST,
        ErrorBody::new("Validation failed").with_details(json!(problems)),
    )
}

fn database(e: &sqlx::Error) -> (StatusCode, ErrorBody) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new("Database error").with_details(json!(e.to_string())),
    )
}

fn internal(e: &dyn std::error::Error) -> (StatusCode, ErrorBody) {
    error!(error = %e, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new("Internal server error"),
    )
}

impl ApiError {
    fn parts(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::MissingToken => (StatusCode::UNAUTHORIZED, ErrorBody::new("Unauthorized")),
                AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::new("Invalid token"))
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::new("Invalid credentials"))
                }
                AuthError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, ErrorBody::new("Project not found"))
                }
                AuthError::Database(e) => database(&e),
                AuthError::Token(e) => internal(&e),
                AuthError::Hash(e) => internal(&e),
                AuthError::Blocking(e) => internal(&e),
            },
            ApiError::Intake(e) => match e {
                IntakeError::Validation(problems) => validation(problems),
                IntakeError::Persistence { entity, source } => {
                    error!(entity, error = %source, "Intake persistence failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::new(format!("Failed to create {entity}"))
                            .with_details(json!(source.to_string())),
                    )
                }
            },
            ApiError::Schedule(e) => match e {
                ScheduleError::Database(e) => database(&e),
                ScheduleError::NotFound => (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new("Schedule event not found"),
                ),
                ScheduleError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, ErrorBody::new("Project not found"))
                }
                ScheduleError::InvalidTransition { from, to } => (
                    StatusCode::CONFLICT,
                    ErrorBody::new("Invalid status transition")
                        .with_details(json!({ "from": from, "to": to })),
                ),
                ScheduleError::Validation(problem) => validation(vec![problem]),
                ScheduleError::Calendar(e) => validation(vec![e.to_string()]),
            },
            ApiError::JsonBody(rejection) => validation(vec![rejection.body_text()]),
            ApiError::QueryString(rejection) => validation(vec![rejection.body_text()]),
            ApiError::PathParam(rejection) => validation(vec![rejection.body_text()]),
            ApiError::Database(e) => database(&e),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(format!("{what} not found")),
            ),
            ApiError::Validation(problems) => validation(problems),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use db::models::schedule_event::EventStatus;

    use super::*;

    fn render(err: ApiError) -> (StatusCode, Value) {
        let (status, body) = err.parts();
        (status, serde_json::to_value(body).unwrap())
    }

    #[test]
    fn auth_errors_are_401_with_distinct_messages() {
        let (status, body) = render(AuthError::MissingToken.into());
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (_, body) = render(AuthError::InvalidToken.into());
        assert_eq!(body["error"], "Invalid token");

        let (_, body) = render(AuthError::InvalidCredentials.into());
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[test]
    fn intake_persistence_names_the_entity() {
        let (status, body) = render(
            IntakeError::Persistence {
                entity: "project",
                source: sqlx::Error::RowNotFound,
            }
            .into(),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create project");
        assert!(body["details"].is_string());
    }

    #[test]
    fn illegal_transition_is_conflict() {
        let (status, body) = render(
            ScheduleError::InvalidTransition {
                from: EventStatus::Completed,
                to: EventStatus::Pending,
            }
            .into(),
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["details"], json!({ "from": "completed", "to": "pending" }));
    }

    #[test]
    fn validation_lists_every_problem() {
        let (status, body) = render(IntakeError::Validation(vec!["a".into(), "b".into()]).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"], json!(["a", "b"]));
    }
}
