//! Destination URL validation.
//!
//! Destinations must be absolute `http`/`https` URLs. They are stored in a
//! canonical form: lower-case host, no fragment, no default port.

use url::Url;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must contain a host")]
    MissingHost,
}

/// Validates `input` and returns its canonical form.
///
/// # Errors
///
/// Returns [`UrlValidationError`] for unparsable input, non-HTTP schemes,
/// or URLs without a host.
pub fn canonicalize_destination(input: &str) -> Result<String, UrlValidationError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    // the url crate already lower-cases registered domain names
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url.to_string())
}
