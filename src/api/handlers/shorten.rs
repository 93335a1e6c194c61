//! Handler for the short URL creation endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::short_url::{ShortUrlResponse, ShortenRequest};
use crate::api::middleware::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL owned by the caller.
///
/// # Endpoint
///
/// `POST /shorten` (Bearer token required)
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "shortCode": "mylink",
///   "title": "Example",
///   "tags": ["docs"]
/// }
/// ```
///
/// Without `shortCode` a random alphanumeric code is allocated.
///
/// # Response
///
/// `201 Created` with the new record:
///
/// ```json
/// {
///   "id": 1,
///   "original_url": "https://example.com/very/long/url",
///   "short_code": "mylink",
///   "short_url": "http://localhost:3000/mylink",
///   "user_id": 7,
///   "access_count": 0,
///   ...
/// }
/// ```
///
/// # Errors
///
/// - `400` for an invalid URL, an invalid code or a code already in use
/// - `401` without a valid token
/// - `503` if no free code could be allocated or the store is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortUrlResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let created = state
        .short_url_service
        .create(user.id, payload.into())
        .await?;

    let short_url = state.short_url_service.short_url(&created.short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortUrlResponse::new(created, short_url)),
    ))
}
