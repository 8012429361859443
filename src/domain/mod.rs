//! Domain layer: entities, repository contracts and the click event model.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event passed to the ingestion worker
//!
//! The domain layer has no dependencies on infrastructure or HTTP code.
//!
//! # Click Processing Flow
//!
//! 1. The redirect path resolves the link and builds a [`click_event::ClickEvent`]
//! 2. The event is pushed onto a bounded channel without waiting
//! 3. [`crate::application::workers::click_worker::run_click_worker`] drains it
//! 4. [`crate::application::services::ClickIngestionService`] enriches and persists it

pub mod click_event;
pub mod entities;
pub mod repositories;
