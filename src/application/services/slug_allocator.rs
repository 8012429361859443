//! Short code allocation.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, normalize_code, validate_alias};

/// Random draws before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// A code that passed its uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slug {
    pub code: String,
    /// True when the caller chose the code.
    pub custom: bool,
}

/// Turns an optional custom alias into a verified-free code.
///
/// The allocator never claims a code: it only checks existence. The store's
/// uniqueness constraint has the final word at insert time.
pub struct SlugAllocator<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> SlugAllocator<L> {
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Allocates a code.
    ///
    /// A present, non-blank alias is normalized, validated and checked once.
    /// Otherwise random codes are drawn until a free one is found.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed alias
    /// - [`AppError::Conflict`] if the alias is taken
    /// - [`AppError::AllocationExhausted`] after [`MAX_ATTEMPTS`] taken random codes
    /// - [`AppError::Dependency`] on store errors
    pub async fn allocate(&self, alias: Option<&str>) -> Result<Slug, AppError> {
        match alias.map(normalize_code).filter(|a| !a.is_empty()) {
            Some(alias) => self.allocate_custom(alias).await,
            None => self.allocate_random().await,
        }
    }

    async fn allocate_custom(&self, alias: String) -> Result<Slug, AppError> {
        validate_alias(&alias)?;

        if self.link_repository.exists_by_code(&alias).await? {
            return Err(AppError::conflict(
                "Custom alias is already taken",
                json!({ "alias": alias }),
            ));
        }

        Ok(Slug {
            code: alias,
            custom: true,
        })
    }

    async fn allocate_random(&self) -> Result<Slug, AppError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let code = generate_code()?;

            if !self.link_repository.exists_by_code(&code).await? {
                return Ok(Slug {
                    code,
                    custom: false,
                });
            }

            debug!(attempt, code, "random code collision");
        }

        Err(AppError::exhausted(
            "Failed to generate a unique code",
            json!({ "attempts": MAX_ATTEMPTS }),
        ))
    }
}
