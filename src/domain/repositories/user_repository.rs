//! Repository trait for link owners.

use crate::domain::entities::Owner;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, AppError>;

    /// Registers an owner record. Used by the admin CLI only.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn create(&self, email: &str) -> Result<Owner, AppError>;
}
