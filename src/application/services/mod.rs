//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_ingestion;
pub mod link_service;
pub mod redirect_service;
pub mod slug_allocator;

pub use auth_service::AuthService;
pub use click_ingestion::ClickIngestionService;
pub use link_service::{CreateLink, LinkRef, LinkService};
pub use redirect_service::{RedirectService, Resolution};
pub use slug_allocator::{Slug, SlugAllocator};
