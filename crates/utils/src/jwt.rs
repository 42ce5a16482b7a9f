//! Signed bearer tokens shared by the admin and customer login flows.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

/// Identity carried by every token.
///
/// Admin tokens use the admin id as `sub` and carry `email`; customer tokens are scoped to a
/// single job and carry its `project_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    admin_ttl: Duration,
    customer_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], admin_ttl: Duration, customer_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            admin_ttl,
            customer_ttl,
        }
    }

    pub fn issue_admin(&self, admin_id: Uuid, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: admin_id.to_string(),
            role: Role::Admin,
            email: Some(email.to_string()),
            project_id: None,
            iat: now.timestamp(),
            exp: (now + self.admin_ttl).timestamp(),
        })
    }

    pub fn issue_customer(&self, project_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: project_id.to_string(),
            role: Role::Customer,
            email: None,
            project_id: Some(project_id),
            iat: now.timestamp(),
            exp: (now + self.customer_ttl).timestamp(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Fails closed on anything but a well-formed, correctly signed, unexpired token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}
