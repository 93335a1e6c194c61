#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use snaplink::application::services::{AuthService, CodePolicy, ShortUrlService};
use snaplink::domain::entities::{ExternalProfile, NewShortUrl, NewUser, ShortUrl, ShortUrlPatch, User};
use snaplink::domain::repositories::{ShortUrlRepository, UserRepository};
use snaplink::error::AppError;
use snaplink::infrastructure::oauth::IdentityProvider;
use snaplink::routes::api_router;
use snaplink::state::AppState;

pub const BASE_URL: &str = "http://sn.test";
pub const JWT_SECRET: &str = "integration-test-secret-with-32-bytes!";
pub const PASSWORD: &str = "correct-horse";

/// In-memory store enforcing the same unique keys and cascade as the schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    urls: Vec<ShortUrl>,
    next_user_id: i64,
    next_url_id: i64,
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::conflict(
        "Unique constraint violation",
        json!({ "constraint": constraint }),
    )
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn url_count(&self) -> usize {
        self.lock().urls.len()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn find_url(&self, code: &str) -> Option<ShortUrl> {
        self.lock()
            .urls
            .iter()
            .find(|u| u.short_code == code)
            .cloned()
    }
}

#[async_trait]
impl ShortUrlRepository for MemoryStore {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut inner = self.lock();
        if inner.urls.iter().any(|u| u.short_code == new_url.short_code) {
            return Err(unique_violation("short_urls_short_code_key"));
        }
        if !inner.users.iter().any(|u| u.id == new_url.user_id) {
            return Err(AppError::not_found(
                "Referenced record does not exist",
                json!({ "constraint": "short_urls_user_id_fkey" }),
            ));
        }

        inner.next_url_id += 1;
        let now = Utc::now();
        let url = ShortUrl {
            id: inner.next_url_id,
            original_url: new_url.original_url,
            short_code: new_url.short_code,
            user_id: new_url.user_id,
            access_count: 0,
            title: new_url.title,
            tags: new_url.tags,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        };
        inner.urls.push(url.clone());
        Ok(url)
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.lock().urls.iter().any(|u| u.short_code == code))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.find_url(code))
    }

    async fn record_access(&self, code: &str) -> Result<Option<String>, AppError> {
        let mut inner = self.lock();
        Ok(inner
            .urls
            .iter_mut()
            .find(|u| u.short_code == code)
            .map(|u| {
                u.access_count += 1;
                u.last_accessed_at = Some(Utc::now());
                u.original_url.clone()
            }))
    }

    async fn find_owned(&self, code: &str, user_id: i64) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .lock()
            .urls
            .iter()
            .find(|u| u.short_code == code && u.user_id == user_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        code: &str,
        user_id: i64,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        let mut inner = self.lock();
        Ok(inner
            .urls
            .iter_mut()
            .find(|u| u.short_code == code && u.user_id == user_id)
            .map(|u| {
                u.original_url = patch.original_url;
                if let Some(title) = patch.title {
                    u.title = title;
                }
                if let Some(tags) = patch.tags {
                    u.tags = tags;
                }
                u.updated_at = Utc::now();
                u.clone()
            }))
    }

    async fn delete_owned(&self, code: &str, user_id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let before = inner.urls.len();
        inner
            .urls
            .retain(|u| !(u.short_code == code && u.user_id == user_id));
        Ok(inner.urls.len() < before)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ShortUrl>, AppError> {
        let mut urls: Vec<ShortUrl> = self
            .lock()
            .urls
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect();
        urls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(urls)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(unique_violation("users_email_key"));
        }
        if new_user.username.is_some()
            && inner.users.iter().any(|u| u.username == new_user.username)
        {
            return Err(unique_violation("users_username_key"));
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            google_id: new_user.google_id,
            is_verified: new_user.is_verified,
            profile_picture: new_user.profile_picture,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|u| u.username.as_deref() == Some(username)))
    }

    async fn find_or_create_external(&self, profile: ExternalProfile) -> Result<User, AppError> {
        let mut inner = self.lock();

        if let Some(user) = inner
            .users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(profile.subject.as_str()))
        {
            return Ok(user.clone());
        }

        if let Some(user) = inner.users.iter_mut().find(|u| u.email == profile.email) {
            user.google_id = Some(profile.subject.clone());
            user.is_verified = true;
            if user.profile_picture.is_none() {
                user.profile_picture = profile.picture.clone();
            }
            return Ok(user.clone());
        }

        let preferred = profile.preferred_username();
        let taken = inner
            .users
            .iter()
            .any(|u| u.username.as_deref() == Some(preferred.as_str()));

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: profile.email,
            username: (!taken).then_some(preferred),
            password_hash: None,
            google_id: Some(profile.subject),
            is_verified: true,
            profile_picture: profile.picture,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        let deleted = inner.users.len() < before;
        if deleted {
            inner.urls.retain(|u| u.user_id != id);
        }
        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock().users.clone())
    }
}

/// Short URL store whose calls never complete.
pub struct StalledStore;

#[async_trait]
impl ShortUrlRepository for StalledStore {
    async fn create(&self, _new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        std::future::pending().await
    }

    async fn code_exists(&self, _code: &str) -> Result<bool, AppError> {
        std::future::pending().await
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortUrl>, AppError> {
        std::future::pending().await
    }

    async fn record_access(&self, _code: &str) -> Result<Option<String>, AppError> {
        std::future::pending().await
    }

    async fn find_owned(&self, _code: &str, _user_id: i64) -> Result<Option<ShortUrl>, AppError> {
        std::future::pending().await
    }

    async fn update_owned(
        &self,
        _code: &str,
        _user_id: i64,
        _patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        std::future::pending().await
    }

    async fn delete_owned(&self, _code: &str, _user_id: i64) -> Result<bool, AppError> {
        std::future::pending().await
    }

    async fn list_by_owner(&self, _user_id: i64) -> Result<Vec<ShortUrl>, AppError> {
        std::future::pending().await
    }

    async fn ping(&self) -> Result<(), AppError> {
        std::future::pending().await
    }
}

/// Identity provider that accepts the code `good-code` only.
pub struct FakeGoogle {
    pub profile: ExternalProfile,
}

#[async_trait]
impl IdentityProvider for FakeGoogle {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.google.test/o/oauth2/v2/auth?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError> {
        if code == "good-code" {
            Ok(self.profile.clone())
        } else {
            Err(AppError::unauthorized("Google sign-in failed", Value::Null))
        }
    }
}

pub fn google_profile() -> ExternalProfile {
    ExternalProfile {
        subject: "google-sub-1".to_string(),
        email: "grace@example.com".to_string(),
        name: Some("Grace Hopper".to_string()),
        picture: Some("https://images.test/grace.png".to_string()),
    }
}

pub fn build_state(
    short_urls: Arc<dyn ShortUrlRepository>,
    users: Arc<dyn UserRepository>,
    store_timeout: Duration,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
) -> AppState {
    AppState::new(
        ShortUrlService::new(short_urls, CodePolicy::default(), store_timeout, BASE_URL),
        AuthService::new(
            users,
            JWT_SECRET,
            Duration::from_secs(3600),
            store_timeout,
        ),
        identity_provider,
    )
}

pub fn create_test_state(store: &Arc<MemoryStore>) -> AppState {
    build_state(store.clone(), store.clone(), Duration::from_secs(5), None)
}

pub fn create_test_server(store: &Arc<MemoryStore>) -> TestServer {
    TestServer::new(api_router(create_test_state(store))).unwrap()
}

/// Registers an account over HTTP and returns its access token.
pub async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/auth/register")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Creates a short URL over HTTP and returns the response body.
pub async fn shorten(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/shorten")
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Inserts a password-less user row and returns its id.
pub async fn insert_user(pool: &sqlx::PgPool, email: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn new_short_url(user_id: i64, code: &str, target: &str) -> NewShortUrl {
    NewShortUrl {
        original_url: target.to_string(),
        short_code: code.to_string(),
        user_id,
        title: None,
        tags: Vec::new(),
    }
}
