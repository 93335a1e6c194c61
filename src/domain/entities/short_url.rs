//! Short URL entity representing a code-to-target mapping owned by a user.

use chrono::{DateTime, Utc};

/// Separator used when tags are persisted as delimited text.
pub const TAG_SEPARATOR: char = ',';

/// A short code mapped to its target URL.
#[derive(Debug, Clone)]
pub struct ShortUrl {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub user_id: i64,
    pub access_count: i64,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Returns true if `user_id` owns this record.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// Input data for creating a short URL.
#[derive(Debug, Clone)]
pub struct NewShortUrl {
    pub original_url: String,
    pub short_code: String,
    pub user_id: i64,
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Owner-initiated update of a short URL.
///
/// `title: None` leaves the title unchanged, `Some(None)` clears it.
/// `tags: None` leaves the tags unchanged, `Some(vec)` replaces them.
#[derive(Debug, Clone)]
pub struct ShortUrlPatch {
    pub original_url: String,
    pub title: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Joins tags into their stored form. An empty list is stored as `NULL`.
pub fn encode_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(&TAG_SEPARATOR.to_string()))
    }
}

/// Splits stored tags back into a list, skipping empty segments.
pub fn decode_tags(stored: Option<&str>) -> Vec<String> {
    stored
        .map(|s| {
            s.split(TAG_SEPARATOR)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
