//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`   - Short URL redirect (public)
//! - `GET  /health`   - Health check (public)
//! - `/auth/*`        - Registration and sign-in (public, rate limited)
//! - everything else  - Owner API (Bearer token required, rate limited)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket
//! - **Authentication** - JWT Bearer token
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, RateLimit};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `limit` - per-IP quota applied to the account and owner API routes
///
/// # Errors
///
/// Returns an error if `limit` is not a valid quota.
pub fn app_router(state: AppState, limit: RateLimit) -> anyhow::Result<NormalizePath<Router>> {
    let protected = protected(&state).layer(rate_limit::layer(limit)?);
    let accounts = api::routes::auth_routes().layer(rate_limit::layer(limit)?);

    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(protected)
        .merge(accounts)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}

/// All routes with authentication but without rate limiting or tracing.
///
/// Used where no peer address is available, such as in-process tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(protected(&state))
        .merge(api::routes::auth_routes())
        .with_state(state)
}

fn protected(state: &AppState) -> Router<AppState> {
    api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
}
