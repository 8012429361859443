//! Long-running background tasks.
//!
//! - [`click_worker`] - Drains the click queue into the ingestion service
//! - [`expiration_sweeper`] - Periodically retires expired links

pub mod click_worker;
pub mod expiration_sweeper;

pub use click_worker::run_click_worker;
pub use expiration_sweeper::{ExpirationSweeper, SweepReport, SweeperHandle};
