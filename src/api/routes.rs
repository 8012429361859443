//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    check_code_handler, create_link_handler, delete_link_handler, get_link_by_code_handler,
    get_link_handler, list_links_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`              - Create a short link
/// - `GET    /links`              - List the caller's links
/// - `GET    /links/{id}`         - Get one of the caller's links
/// - `PATCH  /links/{id}`         - Partially update a link
/// - `DELETE /links/{id}`         - Delete a link and its clicks
/// - `GET    /links/code/{code}`  - Get one of the caller's links by code
/// - `GET    /links/check/{code}` - Check whether a code is taken
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/code/{code}", get(get_link_by_code_handler))
        .route("/links/check/{code}", get(check_code_handler))
}
