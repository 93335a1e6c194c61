//! Account management and access-token authentication.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{info, warn};
use validator::ValidateEmail;

use super::bounded;
use crate::auth::jwt::{self, Claims, JwtError};
use crate::auth::password::{self, MIN_PASSWORD_LENGTH};
use crate::domain::entities::user::email_local_part;
use crate::domain::entities::{ExternalProfile, NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Longest accepted username, matching the `username` column width.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Longest accepted e-mail address.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Input for a password registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

/// Service for user accounts and bearer tokens.
///
/// Password hashing runs on the blocking pool. Tokens are HS256 JWTs whose
/// subject is the user id; a token of a deleted user no longer resolves.
pub struct AuthService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    store_timeout: Duration,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - user repository
    /// - `jwt_secret` - HS256 signing key
    /// - `token_ttl` - lifetime of issued tokens
    /// - `store_timeout` - deadline for each store call
    pub fn new(
        repository: Arc<R>,
        jwt_secret: impl Into<String>,
        token_ttl: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            jwt_secret: jwt_secret.into(),
            token_ttl: chrono::Duration::from_std(token_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
            store_timeout,
        }
    }

    /// Lifetime of issued tokens in seconds.
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl.num_seconds()
    }

    /// Creates a password account.
    ///
    /// The username defaults to the e-mail local part. An explicitly
    /// requested username that is taken is a conflict; a defaulted one that
    /// is taken is left unset.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed e-mail, short password
    /// or invalid username, and [`AppError::Conflict`] if the e-mail or the
    /// requested username is already registered.
    pub async fn register_local(&self, registration: Registration) -> Result<User, AppError> {
        let email = normalize_email(&registration.email)?;

        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_request(
                "Password must be at least 8 characters",
                json!({ "min_length": MIN_PASSWORD_LENGTH }),
            ));
        }

        let existing = bounded(
            self.store_timeout,
            "find_by_email",
            self.repository.find_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let username = match registration.username {
            Some(requested) => {
                let requested = check_username(&requested)?;
                if self.username_taken(&requested).await? {
                    return Err(AppError::conflict(
                        "Username already exists",
                        json!({ "username": requested }),
                    ));
                }
                Some(requested)
            }
            None => {
                let fallback = default_username(&email);
                if fallback.is_empty() || self.username_taken(&fallback).await? {
                    None
                } else {
                    Some(fallback)
                }
            }
        };

        let password_hash = hash_off_thread(registration.password).await?;

        let new_user = NewUser {
            email,
            username,
            password_hash: Some(password_hash),
            google_id: None,
            is_verified: false,
            profile_picture: None,
        };

        let user = bounded(self.store_timeout, "create_user", self.repository.create(new_user))
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AppError::conflict("Email or username already exists", e.details().clone())
                } else {
                    e
                }
            })?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies e-mail and password and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with the same message for an
    /// unknown e-mail, a wrong password or a password-less account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();

        let user = bounded(
            self.store_timeout,
            "find_by_email",
            self.repository.find_by_email(&email),
        )
        .await?
        .ok_or_else(invalid_credentials)?;

        let Some(hash) = user.password_hash.clone() else {
            return Err(invalid_credentials());
        };

        if !verify_off_thread(password.to_string(), hash).await? {
            return Err(invalid_credentials());
        }

        info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    /// Issues an access token for `user_id`.
    pub fn issue_token(&self, user_id: i64) -> Result<String, AppError> {
        let claims = Claims::new(user_id, self.token_ttl);

        jwt::create_token(&claims, &self.jwt_secret).map_err(|e| {
            AppError::internal("Failed to issue access token", json!({ "reason": e.to_string() }))
        })
    }

    /// Resolves a bearer token to the id of an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for expired, forged or malformed
    /// tokens and for tokens whose user no longer exists.
    pub async fn resolve_identity(&self, token: &str) -> Result<i64, AppError> {
        let claims = jwt::validate_token(token, &self.jwt_secret).map_err(|e| match e {
            JwtError::Expired => {
                AppError::unauthorized("Token has expired", json!({ "reason": "expired" }))
            }
            other => {
                AppError::unauthorized("Invalid token", json!({ "reason": other.to_string() }))
            }
        })?;

        let user_id = claims.user_id().map_err(|e| {
            AppError::unauthorized("Invalid token", json!({ "reason": e.to_string() }))
        })?;

        let user = bounded(
            self.store_timeout,
            "find_user",
            self.repository.find_by_id(user_id),
        )
        .await?;

        match user {
            Some(user) => Ok(user.id),
            None => Err(AppError::unauthorized(
                "Invalid token",
                json!({ "reason": "user no longer exists" }),
            )),
        }
    }

    /// Finds or creates the account for an external sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the provider returned no usable
    /// e-mail address.
    pub async fn register_or_find_external(
        &self,
        mut profile: ExternalProfile,
    ) -> Result<User, AppError> {
        profile.email = normalize_email(&profile.email)?;
        profile.name = profile
            .name
            .map(|n| truncate_chars(n.trim(), MAX_USERNAME_LENGTH))
            .filter(|n| !n.is_empty());

        let user = bounded(
            self.store_timeout,
            "find_or_create_external",
            self.repository.find_or_create_external(profile),
        )
        .await?;

        info!(user_id = user.id, "External sign-in");
        Ok(user)
    }

    /// Returns the account of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account no longer exists.
    pub async fn profile(&self, user_id: i64) -> Result<User, AppError> {
        bounded(
            self.store_timeout,
            "find_user",
            self.repository.find_by_id(user_id),
        )
        .await?
        .ok_or_else(|| user_not_found(user_id))
    }

    /// Deletes the account of `user_id` together with its short URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account no longer exists.
    pub async fn delete_account(&self, user_id: i64) -> Result<(), AppError> {
        let deleted = bounded(
            self.store_timeout,
            "delete_user",
            self.repository.delete(user_id),
        )
        .await?;

        if !deleted {
            return Err(user_not_found(user_id));
        }

        warn!(user_id, "User account deleted");
        Ok(())
    }

    async fn username_taken(&self, username: &str) -> Result<bool, AppError> {
        bounded(
            self.store_timeout,
            "username_exists",
            self.repository.username_exists(username),
        )
        .await
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid email or password", Value::Null)
}

fn email_taken() -> AppError {
    AppError::conflict("Email already exists", Value::Null)
}

fn user_not_found(user_id: i64) -> AppError {
    AppError::not_found("User not found", json!({ "user_id": user_id }))
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();

    if email.len() > MAX_EMAIL_LENGTH || !email.validate_email() {
        return Err(AppError::bad_request(
            "Invalid email address",
            json!({ "field": "email" }),
        ));
    }

    Ok(email)
}

fn check_username(username: &str) -> Result<String, AppError> {
    let username = username.trim();
    let length = username.chars().count();

    if length == 0 || length > MAX_USERNAME_LENGTH {
        return Err(AppError::bad_request(
            "Username must be between 1 and 64 characters",
            json!({ "provided_length": length }),
        ));
    }

    Ok(username.to_string())
}

fn default_username(email: &str) -> String {
    truncate_chars(email_local_part(email), MAX_USERNAME_LENGTH)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

async fn hash_off_thread(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| hashing_failed(e.to_string()))?;

    hashed.map_err(|e| hashing_failed(e.to_string()))
}

fn hashing_failed(reason: String) -> AppError {
    AppError::internal("Password hashing failed", json!({ "reason": reason }))
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| {
            AppError::internal("Password verification failed", json!({ "reason": e.to_string() }))
        })?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!(error = %e, "Stored password hash is unreadable");
            Ok(false)
        }
    }
}
