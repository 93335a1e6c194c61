//! Handlers for password registration, sign-in and the caller's account.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::api::middleware::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a password account and signs it in.
///
/// `POST /auth/register`
///
/// ```json
/// { "email": "ada@example.com", "password": "correct horse", "username": "ada" }
/// ```
///
/// `username` is optional and defaults to the part of the e-mail before `@`.
///
/// # Errors
///
/// `400` for invalid input or an e-mail or username already registered.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = state.auth_service.register_local(payload.into()).await?;
    let token = state.auth_service.issue_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            "User created successfully",
            token,
            state.auth_service.token_ttl_seconds(),
            user,
        )),
    ))
}

/// Signs in with e-mail and password.
///
/// `POST /auth/login`
///
/// # Errors
///
/// - `400` if a field is missing
/// - `401` for wrong credentials or a password-less account
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = state
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.auth_service.issue_token(user.id)?;

    Ok(Json(AuthResponse::new(
        "Logged in successfully",
        token,
        state.auth_service.token_ttl_seconds(),
        user,
    )))
}

/// Returns the caller's account.
///
/// `GET /auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.auth_service.profile(user.id).await?;
    Ok(Json(user.into()))
}

/// Deletes the caller's account and every short URL it owns.
///
/// `DELETE /auth/me` returns `204 No Content`.
pub async fn delete_me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.auth_service.delete_account(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
