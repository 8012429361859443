//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored API token. Only the HMAC of the raw token is persisted.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Token storage used by the auth middleware and the admin CLI.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves an active (non-revoked) token hash to its owner.
    async fn find_owner(&self, token_hash: &str) -> Result<Option<Uuid>, AppError>;

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or hash already exists.
    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        owner_id: Uuid,
    ) -> Result<ApiToken, AppError>;

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    async fn revoke_token(&self, id: i64) -> Result<(), AppError>;
}
