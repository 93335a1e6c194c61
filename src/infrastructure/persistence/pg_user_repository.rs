//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ExternalProfile, NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

const COLUMNS: &str =
    "id, email, username, password_hash, google_id, is_verified, profile_picture, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: Option<String>,
    password_hash: Option<String>,
    google_id: Option<String>,
    is_verified: bool,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            google_id: row.google_id,
            is_verified: row.is_verified,
            profile_picture: row.profile_picture,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for user accounts.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users \
             (email, username, password_hash, google_id, is_verified, profile_picture) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(&new_user.google_id)
            .bind(new_user.is_verified)
            .bind(&new_user.profile_picture)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_or_create_external(&self, profile: ExternalProfile) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let by_subject = format!("SELECT {COLUMNS} FROM users WHERE google_id = $1");
        let existing = sqlx::query_as::<_, UserRow>(&by_subject)
            .bind(&profile.subject)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(row.into());
        }

        let link = format!(
            "UPDATE users \
             SET google_id = $2, \
                 is_verified = TRUE, \
                 profile_picture = COALESCE(profile_picture, $3) \
             WHERE email = $1 \
             RETURNING {COLUMNS}"
        );
        let linked = sqlx::query_as::<_, UserRow>(&link)
            .bind(&profile.email)
            .bind(&profile.subject)
            .bind(&profile.picture)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = linked {
            tx.commit().await?;
            tracing::info!(user_id = row.id, "Linked external identity to existing account");
            return Ok(row.into());
        }

        let preferred = profile.preferred_username();
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&preferred)
                .fetch_one(&mut *tx)
                .await?;
        let username = (!taken).then_some(preferred);

        let insert = format!(
            "INSERT INTO users (email, username, google_id, is_verified, profile_picture) \
             VALUES ($1, $2, $3, TRUE, $4) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&insert)
            .bind(&profile.email)
            .bind(&username)
            .bind(&profile.subject)
            .bind(&profile.picture)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY created_at, id");

        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
