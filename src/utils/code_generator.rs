//! Short code generation and custom alias validation.
//!
//! Random codes are 8 characters over `[a-z0-9]`, drawn from the OS CSPRNG
//! with rejection sampling so that every symbol is equally likely.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Symbols used for random codes.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated code.
pub const CODE_LENGTH: usize = 8;

/// Widest code the store accepts.
pub const MAX_ALIAS_LENGTH: usize = 50;

/// Largest multiple of 36 that fits in a byte. Bytes at or above it are
/// discarded so the modulo does not favour the first symbols.
const REJECTION_BOUND: u8 = 252;

/// Codes that would shadow service routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// Generates a random candidate code.
///
/// # Errors
///
/// Returns [`AppError::Dependency`] if the system random source fails.
pub fn generate_code() -> Result<String, AppError> {
    let mut code = String::with_capacity(CODE_LENGTH);
    let mut buffer = [0u8; 16];

    while code.len() < CODE_LENGTH {
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::dependency(
                "Random source unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        for &byte in buffer.iter().filter(|&&b| b < REJECTION_BOUND) {
            if code.len() == CODE_LENGTH {
                break;
            }
            code.push(ALPHABET[usize::from(byte % 36)] as char);
        }
    }

    Ok(code)
}

/// Trims and lower-cases a code or alias before lookup or validation.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validates an already normalized custom alias.
///
/// # Rules
///
/// - 1 to 50 characters
/// - ASCII lowercase letters, digits and interior hyphens
/// - No leading, trailing or doubled hyphen
/// - Not a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            "Custom alias must be 1-50 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !ALIAS_RE.is_match(alias) {
        return Err(AppError::bad_request(
            "Custom alias may only contain letters, digits and single interior hyphens",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_CODES.contains(&alias) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
