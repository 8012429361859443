//! Handler for short URL redirect.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{HeaderMap, header},
    response::Redirect,
};

use crate::domain::click_event::RequestMeta;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up (no authentication, no owner check)
/// 2. Refuse inactive links with 410 Gone
/// 3. Queue a click event with the raw request metadata
/// 4. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click events go to a bounded channel and are enriched by the background
/// worker. If the queue is full the click is dropped; the redirect is never
/// delayed.
///
/// # Errors
///
/// Returns 404 Not Found for an unknown code and 410 Gone for an inactive link.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    req: Request,
) -> Result<Redirect, AppError> {
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let meta = request_meta(req.headers(), peer_ip);

    let destination = state.redirect_service.redirect(&code, meta).await?;

    Ok(Redirect::temporary(&destination))
}

fn request_meta(headers: &HeaderMap, peer_ip: Option<IpAddr>) -> RequestMeta {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RequestMeta {
        forwarded_for: header_str(header::HeaderName::from_static("x-forwarded-for")),
        peer_ip,
        user_agent: header_str(header::USER_AGENT),
        referrer: header_str(header::REFERER),
    }
}
