//! Google sign-in over OpenID Connect.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use super::IdentityProvider;
use crate::domain::entities::ExternalProfile;
use crate::error::AppError;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

/// Client credentials registered with Google.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

/// Google identity provider.
pub struct GoogleProvider {
    config: GoogleConfig,
    authorize_base: Url,
    http: reqwest::Client,
}

impl GoogleProvider {
    /// Creates a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GoogleConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let authorize_base = Url::parse(AUTHORIZE_URL)?;

        Ok(Self {
            config,
            authorize_base,
            http,
        })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(unreachable_provider)?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "Google rejected authorization code");
            return Err(sign_in_failed("authorization code was rejected"));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Malformed Google token response");
            sign_in_failed("malformed token response")
        })?;

        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, AppError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(unreachable_provider)?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "Google userinfo request failed");
            return Err(sign_in_failed("profile request was rejected"));
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Malformed Google userinfo response");
            sign_in_failed("malformed profile response")
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_base.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .append_pair("prompt", "select_account");
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        profile_from_user_info(info)
    }
}

fn profile_from_user_info(info: UserInfo) -> Result<ExternalProfile, AppError> {
    let email = match info.email {
        Some(email) if info.email_verified => email,
        _ => return Err(sign_in_failed("account has no verified email")),
    };

    Ok(ExternalProfile {
        subject: info.sub,
        email,
        name: info.name,
        picture: info.picture,
    })
}

fn sign_in_failed(reason: &str) -> AppError {
    AppError::unauthorized("Google sign-in failed", json!({ "reason": reason }))
}

fn unreachable_provider(e: reqwest::Error) -> AppError {
    tracing::error!(error = %e, "Google is unreachable");
    AppError::unavailable("Identity provider is unavailable", Value::Null)
}
