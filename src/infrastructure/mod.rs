//! Infrastructure layer for external integrations.
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`geoip`] - MaxMind geo lookup
//! - [`user_agent`] - User-agent classification
//! - [`notifier`] - SMTP and log-only notifiers

pub mod geoip;
pub mod notifier;
pub mod persistence;
pub mod user_agent;
