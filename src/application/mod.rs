//! Application layer services and background workers.
//!
//! Services orchestrate repository calls, validation and business rules and
//! expose a clean API to HTTP handlers and the admin CLI.
//!
//! - [`services::link_service::LinkService`] - Owner-scoped link lifecycle
//! - [`services::slug_allocator::SlugAllocator`] - Collision-safe code allocation
//! - [`services::redirect_service::RedirectService`] - Public redirect path
//! - [`services::click_ingestion::ClickIngestionService`] - Click enrichment
//! - [`services::auth_service::AuthService`] - API token authentication
//! - [`workers`] - Click worker and expiration sweeper

pub mod services;
pub mod workers;
