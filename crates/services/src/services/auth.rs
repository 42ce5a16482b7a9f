//! Admin and customer sign-in, token verification and project access codes.

use db::models::{access_credential::AccessCredential, admin_user::AdminUser, project::Project};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use ts_rs::TS;
use utils::{
    access_code,
    jwt::{Claims, TokenError, TokenIssuer},
    password::{self, HashError},
};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("project not found")]
    ProjectNotFound,
    #[error("token signing failed: {0}")]
    Token(#[source] TokenError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("password task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CustomerLoginRequest {
    pub address: String,
    pub access_code: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminUser,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CustomerSession {
    pub token: String,
    pub project_id: Uuid,
}

/// Returned once, when a code is (re)generated. Only the hash is stored.
#[derive(Debug, Clone, Serialize, TS)]
pub struct IssuedAccessCode {
    pub project_id: Uuid,
    pub access_code: String,
}

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            tokens,
            bcrypt_cost,
        }
    }

    /// bcrypt is CPU-bound, so hashing runs on the blocking pool.
    async fn hash_secret(&self, secret: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || password::hash(&secret, cost)).await??)
    }

    async fn verify_secret(secret: String, hash: String) -> Result<bool, AuthError> {
        Ok(tokio::task::spawn_blocking(move || password::verify(&secret, &hash)).await?)
    }

    pub async fn login_admin(&self, request: &AdminLoginRequest) -> Result<AdminSession, AuthError> {
        let Some(admin) = AdminUser::find_by_email(&self.pool, &request.email).await? else {
            // One bcrypt round, same as a wrong password.
            self.hash_secret(request.password.clone()).await?;
            debug!("Admin login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !Self::verify_secret(request.password.clone(), admin.password_hash.clone()).await? {
            warn!(admin_id = %admin.id, "Admin login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_admin(admin.id, &admin.email)
            .map_err(AuthError::Token)?;
        info!(admin_id = %admin.id, "Admin signed in");
        Ok(AdminSession { token, admin })
    }

    /// Several projects can share an address; the first credential the code matches wins.
    pub async fn login_customer(
        &self,
        request: &CustomerLoginRequest,
    ) -> Result<CustomerSession, AuthError> {
        let address = request.address.trim();
        let code = access_code::normalize(&request.access_code);
        if address.is_empty() || code.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let candidates = AccessCredential::find_by_customer_address(&self.pool, address).await?;
        if candidates.is_empty() {
            self.hash_secret(code).await?;
            warn!("Customer login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let matched = tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .find(|c| password::verify(&code, &c.code_hash))
        })
        .await?;
        let Some(credential) = matched else {
            warn!("Customer login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self
            .tokens
            .issue_customer(credential.project_id)
            .map_err(AuthError::Token)?;
        info!(project_id = %credential.project_id, "Customer signed in");
        Ok(CustomerSession {
            token,
            project_id: credential.project_id,
        })
    }

    /// Pure check of signature and expiry. Every failure collapses to `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })
    }

    /// Issues a fresh code for the project, replacing any previous one.
    pub async fn generate_access_code(&self, project_id: Uuid) -> Result<IssuedAccessCode, AuthError> {
        if Project::find_by_id(&self.pool, project_id).await?.is_none() {
            return Err(AuthError::ProjectNotFound);
        }

        let code = access_code::generate();
        let code_hash = self.hash_secret(code.clone()).await?;
        AccessCredential::upsert(&self.pool, project_id, &code_hash).await?;

        info!(project_id = %project_id, "Access code issued");
        Ok(IssuedAccessCode {
            project_id,
            access_code: code,
        })
    }

    /// Creates the admin account on first start. Returns `None` when it already exists.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminUser>, AuthError> {
        if AdminUser::find_by_email(&self.pool, email).await?.is_some() {
            return Ok(None);
        }
        let hash = self.hash_secret(password.to_string()).await?;
        let admin = AdminUser::create(&self.pool, email, None, &hash).await?;
        info!(admin_id = %admin.id, email = %admin.email, "Bootstrap admin created");
        Ok(Some(admin))
    }
}
