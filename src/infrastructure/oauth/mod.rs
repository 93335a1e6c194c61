//! External identity providers.
//!
//! A provider turns an authorization code from its consent screen into an
//! [`ExternalProfile`]. Account matching and creation happen in
//! [`crate::application::services::AuthService`], not here.

pub mod google;

pub use google::{GoogleConfig, GoogleProvider};

use async_trait::async_trait;

use crate::domain::entities::ExternalProfile;
use crate::error::AppError;

/// Authorization-code identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Consent screen URL carrying the anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the provider rejects the code or
    /// the account has no verified e-mail, and [`AppError::Unavailable`] if
    /// the provider cannot be reached.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError>;
}
