//! DTOs for account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::auth_service::Registration;
use crate::domain::entities::User;

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            username: req.username,
        }
    }
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: Option<String>,
    pub email: String,
    pub is_verified: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}

/// Response of a successful registration or sign-in.
///
/// ```json
/// {
///   "message": "Logged in successfully",
///   "access_token": "eyJhbGciOi...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "user": { "id": 1, "email": "ada@example.com", ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(message: &'static str, access_token: String, expires_in: i64, user: User) -> Self {
        Self {
            message,
            access_token,
            token_type: "Bearer",
            expires_in,
            user: user.into(),
        }
    }
}

/// Query string of the external sign-in callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
