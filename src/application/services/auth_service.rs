//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 under `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses the
/// same function when issuing tokens.
pub fn hash_token(signing_secret: &str, token: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes()).map_err(|e| {
        AppError::dependency("Invalid signing key", json!({ "reason": e.to_string() }))
    })?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Resolves Bearer tokens to the owner they were issued for.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns its owner id.
    ///
    /// On success the token's `last_used_at` is refreshed; a failure to do
    /// so does not fail authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthenticated`] if the token is unknown or revoked.
    /// Returns [`AppError::Dependency`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        let token_hash = hash_token(&self.signing_secret, token)?;

        let owner_id = self
            .repository
            .find_owner(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthenticated(
                    "Unauthorized",
                    json!({"reason": "Invalid or revoked token"}),
                )
            })?;

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!(error = %e, "failed to update token last_used_at");
        }

        Ok(owner_id)
    }
}
