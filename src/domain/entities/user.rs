//! User account entity.

use chrono::{DateTime, Utc};

/// A registered account.
///
/// `password_hash` is absent for accounts created through an external
/// identity provider; such users can only sign in through that provider.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns true if the account can authenticate with a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Returns true if the account is linked to an external identity.
    pub fn is_external(&self) -> bool {
        self.google_id.is_some()
    }
}

/// Input data for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub profile_picture: Option<String>,
}

/// Profile returned by an external identity provider after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Provider-scoped stable subject identifier.
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl ExternalProfile {
    /// Display name to use as username, falling back to the e-mail local part.
    pub fn preferred_username(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email_local_part(&self.email).to_string())
    }
}

/// Returns the part of an e-mail address before `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
