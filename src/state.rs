//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, ShortUrlService};
use crate::domain::repositories::{ShortUrlRepository, UserRepository};
use crate::infrastructure::oauth::IdentityProvider;

/// Services constructed once at startup.
///
/// Repositories are held as trait objects so the same router runs against
/// PostgreSQL in production and in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    pub short_url_service: Arc<ShortUrlService<dyn ShortUrlRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    /// Google sign-in; `None` when not configured.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn new(
        short_url_service: ShortUrlService<dyn ShortUrlRepository>,
        auth_service: AuthService<dyn UserRepository>,
        identity_provider: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        Self {
            short_url_service: Arc::new(short_url_service),
            auth_service: Arc::new(auth_service),
            identity_provider,
        }
    }
}
