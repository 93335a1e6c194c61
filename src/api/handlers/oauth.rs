//! Handlers for Google sign-in.
//!
//! The flow is the standard authorization-code grant. A random `state` is
//! stored in a short-lived `HttpOnly` cookie scoped to `/auth/google` and
//! must come back unchanged on the callback.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::api::dto::auth::{AuthResponse, OAuthCallbackQuery};
use crate::error::AppError;
use crate::infrastructure::oauth::IdentityProvider;
use crate::state::AppState;
use crate::utils::code_generator::generate_code;
use crate::utils::cookies::find_cookie;

/// Name of the cookie carrying the anti-forgery state.
pub const STATE_COOKIE: &str = "oauth_state";

const STATE_LENGTH: usize = 32;
const STATE_MAX_AGE_SECS: u32 = 600;

fn provider(state: &AppState) -> Result<&Arc<dyn IdentityProvider>, AppError> {
    state
        .identity_provider
        .as_ref()
        .ok_or_else(|| AppError::not_found("Google sign-in is not configured", Value::Null))
}

fn state_cookie(value: &str, max_age: u32) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{STATE_COOKIE}={value}; Path=/auth/google; Max-Age={max_age}; HttpOnly; SameSite=Lax"
    ))
    .map_err(|e| AppError::internal("Failed to build cookie", json!({ "reason": e.to_string() })))
}

/// Starts Google sign-in.
///
/// `GET /auth/google/login` answers `302 Found` to Google's consent screen
/// and sets the `oauth_state` cookie.
///
/// # Errors
///
/// `404` if Google sign-in is not configured.
pub async fn google_login_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let provider = provider(&state)?;

    let csrf_state = generate_code(STATE_LENGTH);
    let location = HeaderValue::from_str(&provider.authorize_url(&csrf_state)).map_err(|e| {
        AppError::internal("Failed to build redirect", json!({ "reason": e.to_string() }))
    })?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (
                header::SET_COOKIE,
                state_cookie(&csrf_state, STATE_MAX_AGE_SECS)?,
            ),
        ],
    )
        .into_response())
}

/// Completes Google sign-in.
///
/// `GET /auth/google/callback?code=...&state=...`
///
/// Finds the account by Google id, then by e-mail (linking it), or creates
/// a verified password-less account, and returns an access token.
///
/// # Errors
///
/// - `401` if the state does not match, the user denied consent or Google
///   rejected the code
/// - `404` if Google sign-in is not configured
pub async fn google_callback_handler(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let provider = provider(&state)?;

    if let Some(error) = query.error {
        return Err(AppError::unauthorized(
            "Google sign-in was cancelled",
            json!({ "reason": error }),
        ));
    }

    let expected = find_cookie(&headers, STATE_COOKIE);
    match (&query.state, &expected) {
        (Some(got), Some(want)) if !got.is_empty() && got == want => {}
        _ => {
            return Err(AppError::unauthorized(
                "Invalid OAuth state",
                json!({ "reason": "state does not match" }),
            ));
        }
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request("Authorization code is required", Value::Null))?;

    let profile = provider.exchange_code(&code).await?;
    let user = state.auth_service.register_or_find_external(profile).await?;
    let token = state.auth_service.issue_token(user.id)?;

    tracing::info!(user_id = user.id, provider = provider.name(), "External sign-in completed");

    let body = AuthResponse::new(
        "Logged in successfully via Google",
        token,
        state.auth_service.token_ttl_seconds(),
        user,
    );

    Ok((
        [(header::SET_COOKIE, state_cookie("", 0)?)],
        Json(body),
    )
        .into_response())
}
