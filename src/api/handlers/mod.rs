//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;

pub use health::health_handler;
pub use links::{
    check_code_handler, create_link_handler, delete_link_handler, get_link_by_code_handler,
    get_link_handler, list_links_handler, update_link_handler,
};
pub use redirect::redirect_handler;
