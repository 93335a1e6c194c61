//! Target URL validation.
//!
//! Targets are stored exactly as submitted (after trimming surrounding
//! whitespace) so a redirect returns the URL the owner typed. Validation only
//! checks that the input is an absolute HTTP(S) URL with a host.

use url::Url;

/// Longest accepted target URL, matching the `original_url` column width.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur while validating a target URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL is longer than {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Validates a target URL and returns its trimmed form.
///
/// # Rules
///
/// 1. **Length**: at most [`MAX_URL_LENGTH`] characters
/// 2. **Syntax**: must parse as an absolute URL
/// 3. **Protocol**: only `http` and `https`
/// 4. **Host**: must be present and non-empty
///
/// # Errors
///
/// Returns the first violated rule as a [`UrlValidationError`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     validate_target_url(" https://example.com/page ").unwrap(),
///     "https://example.com/page"
/// );
/// assert!(validate_target_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_target_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
