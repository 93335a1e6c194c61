//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::short_url::{decode_tags, encode_tags};
use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

const COLUMNS: &str = "id, original_url, short_code, user_id, access_count, title, tags, \
                       created_at, updated_at, last_accessed_at";

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    original_url: String,
    short_code: String,
    user_id: i64,
    access_count: i64,
    title: Option<String>,
    tags: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(row: ShortUrlRow) -> Self {
        Self {
            id: row.id,
            original_url: row.original_url,
            short_code: row.short_code,
            user_id: row.user_id,
            access_count: row.access_count,
            title: row.title,
            tags: decode_tags(row.tags.as_deref()),
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_accessed_at: row.last_accessed_at,
        }
    }
}

/// PostgreSQL repository for short URLs.
///
/// The `short_urls_short_code_key` unique constraint is the final arbiter of
/// code uniqueness; a violation surfaces as [`AppError::Conflict`].
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let sql = format!(
            "INSERT INTO short_urls (original_url, short_code, user_id, title, tags) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(&new_url.original_url)
            .bind(&new_url.short_code)
            .bind(new_url.user_id)
            .bind(&new_url.title)
            .bind(encode_tags(&new_url.tags))
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM short_urls WHERE short_code = $1");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn record_access(&self, code: &str) -> Result<Option<String>, AppError> {
        let target: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE short_urls
            SET access_count = access_count + 1,
                last_accessed_at = NOW()
            WHERE short_code = $1
            RETURNING original_url
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(target)
    }

    async fn find_owned(&self, code: &str, user_id: i64) -> Result<Option<ShortUrl>, AppError> {
        let sql =
            format!("SELECT {COLUMNS} FROM short_urls WHERE short_code = $1 AND user_id = $2");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(code)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update_owned(
        &self,
        code: &str,
        user_id: i64,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!(
            "UPDATE short_urls \
             SET original_url = $3, \
                 title = CASE WHEN $4 THEN $5 ELSE title END, \
                 tags = CASE WHEN $6 THEN $7 ELSE tags END, \
                 updated_at = NOW() \
             WHERE short_code = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );

        let set_title = patch.title.is_some();
        let title = patch.title.flatten();
        let set_tags = patch.tags.is_some();
        let tags = patch.tags.as_deref().and_then(encode_tags);

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(code)
            .bind(user_id)
            .bind(&patch.original_url)
            .bind(set_title)
            .bind(title)
            .bind(set_tags)
            .bind(tags)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_owned(&self, code: &str, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE short_code = $1 AND user_id = $2")
            .bind(code)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ShortUrl>, AppError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM short_urls WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
