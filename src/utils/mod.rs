//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Random short codes and custom alias validation
//! - [`destination_url`] - Destination URL validation and canonical form
//! - [`client_ip`] - Client address resolution for click records
//! - [`db_error`] - Database error classification

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod destination_url;
