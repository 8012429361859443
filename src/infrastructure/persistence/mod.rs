//! PostgreSQL repository implementations.
//!
//! Queries are checked at runtime with `sqlx::query_as` and row structs, so
//! the crate builds without a live database.
//!
//! - [`PgLinkRepository`] - Link storage, lookup and expiry scan
//! - [`PgClickRepository`] - Click persistence
//! - [`PgUserRepository`] - Owner lookup
//! - [`PgDomainRepository`] - Serving domains
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_click_repository;
pub mod pg_domain_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_domain_repository::PgDomainRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;
