//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Owner id resolved from the request's bearer token.
///
/// Inserted into request extensions by [`layer`]; handlers take it with
/// `Extension<AuthenticatedOwner>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub Uuid);

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Resolve the token hash to its owner (revoked tokens never match)
/// 3. Store [`AuthenticatedOwner`] in request extensions
/// 4. Continue to next middleware/handler
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header
/// is missing or malformed, or the token is unknown or revoked.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/api/links", get(list_links_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthenticated(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let owner_id = st.auth_service.authenticate(&token).await?;

    parts.extensions.insert(AuthenticatedOwner(owner_id));
    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}
