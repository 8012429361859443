//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Store contract for short links.
///
/// Codes are compared exactly; callers normalize them before lookup.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already used on any domain.
    /// Returns [`AppError::Dependency`] on database errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists all links of an owner, newest first.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError>;

    /// Persists the mutable fields of `link` (destination, title, expiry,
    /// active flag) and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    async fn update(&self, link: &Link) -> Result<Link, AppError>;

    /// Deletes a link and its clicks. Returns `false` if nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError>;

    /// Active links whose expiry is at or before `now`.
    async fn find_expired_active(&self, now: DateTime<Utc>) -> Result<Vec<Link>, AppError>;

    /// Clears the active flag on every listed link in a single write.
    ///
    /// Returns the number of rows changed.
    async fn deactivate(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}
