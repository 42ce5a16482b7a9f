//! Request extractors. `Json`, `Query` and `Path` wrap axum's own so that a malformed body,
//! query string or path segment is answered with the JSON error envelope. Adding `AdminClaims`
//! or `CustomerClaims` to a handler's arguments is what makes the route require that role.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use services::services::auth::AuthError;
use utils::jwt::{Claims, Role};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

fn claims_with_role(parts: &Parts, state: &AppState, role: Role) -> Result<Claims, AuthError> {
    let claims = state.auth().verify(bearer_token(parts)?)?;
    if claims.role != role {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(claims_with_role(parts, state, Role::Admin)?))
    }
}

/// A customer token, always scoped to exactly one project.
#[derive(Debug, Clone)]
pub struct CustomerClaims {
    pub project_id: Uuid,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for CustomerClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_with_role(parts, state, Role::Customer)?;
        let project_id = claims.project_id.ok_or(AuthError::InvalidToken)?;
        Ok(Self { project_id, claims })
    }
}
