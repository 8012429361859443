//! Repository trait definitions for the domain layer.
//!
//! Traits define the store contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for unit tests.
//!
//! - [`LinkRepository`] - Short link CRUD and the sweeper's expiry scan
//! - [`ClickRepository`] - Click persistence
//! - [`UserRepository`] - Owner lookup for notifications
//! - [`DomainRepository`] - Serving domains
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod domain_repository;
pub mod link_repository;
pub mod token_repository;
pub mod user_repository;

pub use click_repository::ClickRepository;
pub use domain_repository::DomainRepository;
pub use link_repository::LinkRepository;
pub use token_repository::{ApiToken, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use domain_repository::MockDomainRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
