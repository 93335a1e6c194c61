//! Repository trait for user accounts.

use crate::domain::entities::{ExternalProfile, NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the e-mail, username or external id
    /// is already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Resolves an external sign-in to an account in one transaction.
    ///
    /// Matches by external subject first, then by e-mail (linking the
    /// subject and marking the account verified). Otherwise creates a
    /// verified, password-less account. A username already taken by someone
    /// else is not assigned.
    async fn find_or_create_external(&self, profile: ExternalProfile) -> Result<User, AppError>;

    /// Deletes a user and, by cascade, every short URL they own.
    ///
    /// Returns `false` if the user did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists all users, oldest first.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}
