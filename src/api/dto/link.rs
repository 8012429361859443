//! DTOs for the link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::application::services::CreateLink;
use crate::domain::entities::domain::short_url;
use crate::domain::entities::{Link, LinkPatch};

/// Request body for `POST /api/links`.
///
/// ```json
/// {
///   "destination_url": "https://example.com/landing",
///   "custom_alias": "spring-promo",
///   "title": "Spring promo",
///   "expire_at": "2026-12-31T23:59:59Z",
///   "domain_id": "00000000-0000-0000-0000-000000000001"
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub destination_url: String,

    /// Alias format is checked by the slug allocator.
    pub custom_alias: Option<String>,

    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub expire_at: Option<DateTime<Utc>>,

    pub domain_id: Option<Uuid>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        CreateLink {
            destination_url: req.destination_url,
            custom_alias: req.custom_alias,
            title: req.title,
            expire_at: req.expire_at,
            domain_id: req.domain_id,
        }
    }
}

/// Request body for `PATCH /api/links/{id}`.
///
/// Only provided fields change. `null` is treated like an absent field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub destination_url: Option<String>,

    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub expire_at: Option<DateTime<Utc>>,

    pub is_active: Option<bool>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            destination_url: req.destination_url,
            title: req.title,
            expire_at: req.expire_at,
            is_active: req.is_active,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    /// Absent when the link's domain could not be joined.
    pub short_url: Option<String>,
    pub domain: Option<String>,
    pub is_active: bool,
    pub click_count: i64,
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        LinkResponse {
            short_url: link.domain.as_deref().map(|d| short_url(d, &link.code)),
            id: link.id,
            code: link.code,
            destination_url: link.destination_url,
            title: link.title,
            domain: link.domain,
            is_active: link.is_active,
            click_count: link.click_count,
            expire_at: link.expire_at,
            created_at: link.created_at,
            last_accessed_at: link.last_accessed_at,
        }
    }
}

/// Response of `GET /api/links/check/{code}`.
#[derive(Debug, Serialize)]
pub struct CodeCheckResponse {
    pub code: String,
    pub exists: bool,
}
