//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Behavior
///
/// Each successful resolution increments the code's access counter and
/// stamps its last access time in one atomic update. If counting fails the
/// redirect is still served from a plain lookup.
///
/// # Response
///
/// `302 Found` with `Location` set to the stored target.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.short_url_service.resolve(&code).await?;

    tracing::debug!(short_code = %code, "Redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]))
}
