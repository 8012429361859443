//! `GET /health`: database and click queue status.
//!
//! Responds 200 when both are ok and 503 otherwise, with the same body:
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "checks": {
//!     "database": { "status": "ok", "message": "default domain s.example.com" },
//!     "click_queue": { "status": "ok", "message": "free slots: 10000" }
//!   }
//! }
//! ```

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let response = HealthResponse::from_checks(HealthChecks {
        database: check_database(&state).await,
        click_queue: check_click_queue(&state),
    });

    if response.is_healthy() {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Reaches the store through the default domain lookup.
async fn check_database(state: &AppState) -> CheckStatus {
    match state.domain_repository.get_default().await {
        Ok(domain) => CheckStatus::ok(format!("default domain {}", domain.domain)),
        Err(e) => CheckStatus::error(format!("database error: {e}")),
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    let redirects = &state.redirect_service;
    if redirects.queue_is_closed() {
        CheckStatus::error("click queue is closed")
    } else {
        CheckStatus::ok(format!("free slots: {}", redirects.queue_capacity()))
    }
}
