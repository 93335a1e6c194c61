//! Short code generation and validation utilities.
//!
//! Generated codes are drawn uniformly from the 62-character alphanumeric
//! alphabet. They are not meant to be unguessable: uniqueness is enforced by
//! the store, not by entropy.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Default length of a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Minimum length of a user-provided code.
pub const MIN_CUSTOM_CODE_LENGTH: usize = 3;

/// Maximum length of a user-provided code.
pub const MAX_CUSTOM_CODE_LENGTH: usize = 8;

/// Upper bound of any stored code (width of the `short_code` column).
pub const MAX_STORED_CODE_LENGTH: usize = 16;

/// Codes shadowed by fixed routes and therefore not assignable.
const RESERVED_CODES: &[&str] = &["auth", "health", "shorten", "url", "user"];

/// Generates a random alphanumeric code of exactly `length` characters.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-8 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved route segment
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let length = code.chars().count();
    if !(MIN_CUSTOM_CODE_LENGTH..=MAX_CUSTOM_CODE_LENGTH).contains(&length) {
        return Err(AppError::bad_request(
            "Short code must be between 3 and 8 characters",
            json!({ "provided_length": length }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Short code can only contain letters and numbers",
            json!({ "short_code": code }),
        ));
    }

    if RESERVED_CODES.iter().any(|r| r.eq_ignore_ascii_case(code)) {
        return Err(AppError::bad_request(
            "This short code is reserved",
            json!({ "short_code": code }),
        ));
    }

    Ok(())
}
