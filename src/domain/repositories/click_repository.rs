//! Repository trait for click persistence.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Stores a click and bumps the parent link's counter and
    /// `last_accessed_at` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] on database errors, including a
    /// parent link that was deleted in the meantime.
    async fn record(&self, click: NewClick) -> Result<Click, AppError>;

    /// Number of stored clicks for a link.
    async fn count_for_link(&self, link_id: Uuid) -> Result<i64, AppError>;
}
