//! Repository trait for short URL data access.

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short URLs.
///
/// Owner-scoped operations take both the code and the owner id and must
/// resolve them in a single query, so a foreign code and a missing code are
/// indistinguishable to the caller.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a new short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken
    /// (unique constraint on `short_code`).
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Returns true if any record uses `code`.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Finds a record by code regardless of owner.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Atomically increments the access counter and stamps the access time.
    ///
    /// Returns the target URL, or `None` if no record uses `code`.
    async fn record_access(&self, code: &str) -> Result<Option<String>, AppError>;

    /// Finds a record by code scoped to its owner.
    async fn find_owned(&self, code: &str, user_id: i64) -> Result<Option<ShortUrl>, AppError>;

    /// Applies `patch` to the owner's record and bumps `updated_at`.
    ///
    /// Returns `None` if the owner has no record with this code.
    async fn update_owned(
        &self,
        code: &str,
        user_id: i64,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Deletes the owner's record. Returns `false` if nothing was deleted.
    async fn delete_owned(&self, code: &str, user_id: i64) -> Result<bool, AppError>;

    /// Lists all records of an owner, newest first.
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ShortUrl>, AppError>;

    /// Checks store connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
