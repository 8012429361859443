//! Repository trait for serving domains.

use crate::domain::entities::Domain;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Returns the default domain.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if no default domain is configured.
    async fn get_default(&self) -> Result<Domain, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Domain>, AppError>;
}
