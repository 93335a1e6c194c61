//! Handlers for owner-scoped short URL management.
//!
//! Every lookup is scoped to the caller. A code owned by someone else is
//! reported exactly like a code that does not exist.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::short_url::{ShortUrlResponse, UpdateUrlRequest};
use crate::api::middleware::CurrentUser;
use crate::domain::entities::ShortUrl;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, url: ShortUrl) -> ShortUrlResponse {
    let short_url = state.short_url_service.short_url(&url.short_code);
    ShortUrlResponse::new(url, short_url)
}

/// Returns one of the caller's short URLs.
///
/// `GET /url/{code}`
///
/// # Errors
///
/// `404` if the caller owns no short URL with this code.
pub async fn get_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let url = state.short_url_service.get_owned(&code, user.id).await?;
    Ok(Json(to_response(&state, url)))
}

/// Replaces the target (and optionally title and tags) of a short URL.
///
/// `PUT /url/{code}`
///
/// ```json
/// { "url": "https://example.com/new", "title": null, "tags": ["docs"] }
/// ```
///
/// # Errors
///
/// - `400` for an invalid URL, title or tags
/// - `404` if the caller owns no short URL with this code
pub async fn update_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
    payload: Result<Json<UpdateUrlRequest>, JsonRejection>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let url = state
        .short_url_service
        .update_owned(&code, user.id, payload.into())
        .await?;

    Ok(Json(to_response(&state, url)))
}

/// Deletes one of the caller's short URLs.
///
/// `DELETE /url/{code}` returns `204 No Content`.
///
/// # Errors
///
/// `404` if the caller owns no short URL with this code.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .short_url_service
        .delete_owned(&code, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the caller's short URLs, newest first.
///
/// `GET /user/urls`
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ShortUrlResponse>>, AppError> {
    let urls = state.short_url_service.list_owned(user.id).await?;

    Ok(Json(
        urls.into_iter()
            .map(|url| to_response(&state, url))
            .collect(),
    ))
}
