//! Minimal request cookie lookup.

use axum::http::{HeaderMap, header::COOKIE};

/// Returns the value of the cookie named `name`, if present.
///
/// Handles several cookies in one `Cookie` header and several `Cookie`
/// headers.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value.to_string()),
                _ => None,
            }
        })
}
