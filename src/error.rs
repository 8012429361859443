//! Application error type and its HTTP mapping.
//!
//! Every fallible service and repository operation returns [`AppError`].
//! Each variant carries a human-readable message plus a JSON `details` value
//! that is echoed to API clients.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Error kinds surfaced by the engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (bad alias, bad URL, unknown domain).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The requested code is already taken.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Random code generation kept colliding.
    #[error("{message}")]
    AllocationExhausted { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The link exists but has been deactivated.
    #[error("{message}")]
    Inactive { message: String, details: Value },

    /// The caller is authenticated but does not own the resource.
    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    /// Missing or invalid credentials.
    #[error("{message}")]
    Unauthenticated { message: String, details: Value },

    /// Store, notifier or other infrastructure failure.
    #[error("{message}")]
    Dependency { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::AllocationExhausted {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn inactive(message: impl Into<String>, details: Value) -> Self {
        Self::Inactive {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn unauthenticated(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthenticated {
            message: message.into(),
            details,
        }
    }

    pub fn dependency(message: impl Into<String>, details: Value) -> Self {
        Self::Dependency {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable error code used in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Conflict { .. } => "conflict",
            AppError::AllocationExhausted { .. } => "allocation_exhausted",
            AppError::NotFound { .. } => "not_found",
            AppError::Inactive { .. } => "inactive",
            AppError::Unauthorized { .. } => "forbidden",
            AppError::Unauthenticated { .. } => "unauthorized",
            AppError::Dependency { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::AllocationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Inactive { .. } => StatusCode::GONE,
            AppError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AppError::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if let AppError::Dependency { message, details } = &self {
            tracing::error!(%message, %details, "request failed on a dependency");
        }

        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::Conflict { message, details }
            | AppError::AllocationExhausted { message, details }
            | AppError::NotFound { message, details }
            | AppError::Inactive { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Unauthenticated { message, details } => (message, details),
            // infrastructure details stay in the logs
            AppError::Dependency { message, .. } => (message, json!({})),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::dependency("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = e
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|err| {
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}
