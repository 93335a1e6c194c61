//! API route configuration.

use crate::api::handlers::{
    delete_me_handler, delete_url_handler, get_url_handler, google_callback_handler,
    google_login_handler, list_user_urls_handler, login_handler, me_handler, register_handler,
    shorten_handler, update_url_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes requiring a Bearer token via [`crate::api::middleware::auth`].
///
/// # Endpoints
///
/// - `POST   /shorten`     - Create a short URL
/// - `GET    /url/{code}`  - Details of an owned short URL
/// - `PUT    /url/{code}`  - Replace the target of an owned short URL
/// - `DELETE /url/{code}`  - Delete an owned short URL
/// - `GET    /user/urls`   - List owned short URLs
/// - `GET    /auth/me`     - Current account
/// - `DELETE /auth/me`     - Delete the current account and its short URLs
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route(
            "/url/{code}",
            get(get_url_handler)
                .put(update_url_handler)
                .delete(delete_url_handler),
        )
        .route("/user/urls", get(list_user_urls_handler))
        .route("/auth/me", get(me_handler).delete(delete_me_handler))
}

/// Public account routes.
///
/// # Endpoints
///
/// - `POST /auth/register`        - Create a password account
/// - `POST /auth/login`           - Sign in with e-mail and password
/// - `GET  /auth/google/login`    - Start Google sign-in
/// - `GET  /auth/google/callback` - Complete Google sign-in
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/google/login", get(google_login_handler))
        .route("/auth/google/callback", get(google_callback_handler))
}
