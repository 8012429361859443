//! Handlers for owner-scoped link management.
//!
//! Every handler receives the caller's owner id from
//! [`AuthenticatedOwner`], set by the auth middleware.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::link::{CodeCheckResponse, CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::api::middleware::AuthenticatedOwner;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::normalize_code;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Errors
///
/// - 400 for an invalid URL, alias, title or domain
/// - 409 if the custom alias is taken
/// - 503 if no free random code was found
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(owner_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists the caller's links, newest first.
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_links(owner_id).await?;
    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// `GET /api/links/{id}`
///
/// 404 if the link does not exist, 403 if it belongs to someone else.
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Path(id): Path<Uuid>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(id, owner_id).await?;
    Ok(Json(link.into()))
}

/// `GET /api/links/code/{code}`
pub async fn get_link_by_code_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link_by_code(&code, owner_id).await?;
    Ok(Json(link.into()))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{id}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "destination_url": "https://example.com/new",
///   "title": "Renamed",
///   "expire_at": "2026-12-31T23:59:59Z",
///   "is_active": false
/// }
/// ```
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(id, owner_id, payload.into())
        .await?;

    Ok(Json(link.into()))
}

/// Deletes a link and its recorded clicks.
///
/// `DELETE /api/links/{id}` returns 204 on success.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reports whether a code is taken, across all owners.
///
/// `GET /api/links/check/{code}`
pub async fn check_code_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CodeCheckResponse>, AppError> {
    let exists = state.link_service.code_exists(&code).await?;
    Ok(Json(CodeCheckResponse {
        code: normalize_code(&code),
        exists,
    }))
}
