//! DTOs for short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::short_url_service::{CreateShortUrl, UpdateShortUrl};
use crate::domain::entities::ShortUrl;

/// Request body for `POST /shorten`.
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "shortCode": "mylink",
///   "title": "Example",
///   "tags": ["docs", "rust"]
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Target URL (absolute HTTP/HTTPS).
    #[validate(length(min = 1, max = 2048, message = "URL is required"))]
    pub url: String,

    /// Optional custom short code.
    #[serde(rename = "shortCode", alias = "short_code")]
    pub short_code: Option<String>,

    #[validate(length(max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

impl From<ShortenRequest> for CreateShortUrl {
    fn from(req: ShortenRequest) -> Self {
        Self {
            url: req.url,
            custom_code: req.short_code.filter(|c| !c.is_empty()),
            title: req.title,
            tags: req.tags.unwrap_or_default(),
        }
    }
}

/// Request body for `PUT /url/{code}`.
///
/// # Field semantics
///
/// - `url` is required and replaces the target
/// - `title`: absent = keep, `null` = clear, value = set
/// - `tags`: absent or `null` = keep, list = replace
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    #[validate(length(min = 1, max = 2048, message = "URL is required"))]
    pub url: String,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

impl From<UpdateUrlRequest> for UpdateShortUrl {
    fn from(req: UpdateUrlRequest) -> Self {
        Self {
            url: req.url,
            title: req.title,
            tags: req.tags,
        }
    }
}

/// A short URL as returned by the API.
#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    pub user_id: i64,
    pub access_count: i64,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl ShortUrlResponse {
    /// Builds the response from a record and its public short URL.
    pub fn new(url: ShortUrl, short_url: String) -> Self {
        Self {
            id: url.id,
            original_url: url.original_url,
            short_code: url.short_code,
            short_url,
            user_id: url.user_id,
            access_count: url.access_count,
            title: url.title,
            tags: url.tags,
            created_at: url.created_at,
            updated_at: url.updated_at,
            last_accessed_at: url.last_accessed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shorten_request_accepts_camel_and_snake_case() {
        let camel: ShortenRequest =
            serde_json::from_value(json!({ "url": "https://a.io", "shortCode": "abc" })).unwrap();
        assert_eq!(camel.short_code.as_deref(), Some("abc"));

        let snake: ShortenRequest =
            serde_json::from_value(json!({ "url": "https://a.io", "short_code": "abc" })).unwrap();
        assert_eq!(snake.short_code.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_short_code_means_generated() {
        let req: ShortenRequest =
            serde_json::from_value(json!({ "url": "https://a.io", "shortCode": "" })).unwrap();
        let input = CreateShortUrl::from(req);
        assert!(input.custom_code.is_none());
    }

    #[test]
    fn test_update_title_tristate() {
        let absent: UpdateUrlRequest =
            serde_json::from_value(json!({ "url": "https://a.io" })).unwrap();
        assert_eq!(absent.title, None);

        let cleared: UpdateUrlRequest =
            serde_json::from_value(json!({ "url": "https://a.io", "title": null })).unwrap();
        assert_eq!(cleared.title, Some(None));

        let set: UpdateUrlRequest =
            serde_json::from_value(json!({ "url": "https://a.io", "title": "Hi" })).unwrap();
        assert_eq!(set.title, Some(Some("Hi".to_string())));
    }

    #[test]
    fn test_shorten_request_validation() {
        let empty: ShortenRequest = serde_json::from_value(json!({ "url": "" })).unwrap();
        assert!(empty.validate().is_err());

        let long_title: ShortenRequest = serde_json::from_value(json!({
            "url": "https://a.io",
            "title": "x".repeat(101)
        }))
        .unwrap();
        assert!(long_title.validate().is_err());
    }
}
