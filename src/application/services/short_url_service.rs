//! Short URL allocation, resolution and owner-scoped management.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use super::bounded;
use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::{
    MAX_CUSTOM_CODE_LENGTH, MAX_STORED_CODE_LENGTH, generate_code, validate_custom_code,
};
use crate::utils::url_validator::validate_target_url;

/// Longest accepted title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Most tags a record may carry.
pub const MAX_TAGS: usize = 20;

/// Longest accepted single tag.
pub const MAX_TAG_LENGTH: usize = 32;

/// Bounds for automatic code allocation.
///
/// The allocator tries `attempts_per_length` random codes of
/// `initial_length`, then widens the code by one character at a time up to
/// `max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    pub initial_length: usize,
    pub max_length: usize,
    pub attempts_per_length: usize,
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            initial_length: 4,
            max_length: MAX_CUSTOM_CODE_LENGTH,
            attempts_per_length: 5,
        }
    }
}

impl CodePolicy {
    /// Total number of insert attempts before giving up.
    pub fn max_attempts(&self) -> usize {
        (self.max_length.saturating_sub(self.initial_length) + 1) * self.attempts_per_length
    }
}

/// Input for creating a short URL.
#[derive(Debug, Clone, Default)]
pub struct CreateShortUrl {
    pub url: String,
    pub custom_code: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Input for an owner update.
#[derive(Debug, Clone, Default)]
pub struct UpdateShortUrl {
    pub url: String,
    pub title: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Service owning the short URL lifecycle.
///
/// - **Allocation**: custom codes are validated and checked for conflicts;
///   otherwise random codes are drawn under [`CodePolicy`] and the store's
///   unique constraint decides races.
/// - **Resolution**: one atomic counter update that returns the target; if
///   counting fails, a plain lookup still serves the redirect.
/// - **Ownership**: detail, update and delete are scoped by `(code, owner)`;
///   absence is always `NotFound`.
///
/// Every store call is bounded by `store_timeout` and fails with
/// [`AppError::Unavailable`] when it expires.
pub struct ShortUrlService<R: ShortUrlRepository + ?Sized> {
    repository: Arc<R>,
    policy: CodePolicy,
    store_timeout: Duration,
    base_url: String,
}

impl<R: ShortUrlRepository + ?Sized> ShortUrlService<R> {
    /// Creates a new short URL service.
    ///
    /// `base_url` prefixes codes when building public short URLs.
    pub fn new(
        repository: Arc<R>,
        policy: CodePolicy,
        store_timeout: Duration,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            policy,
            store_timeout,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Creates a short URL owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL, title, tags or
    /// custom code, [`AppError::Conflict`] if the custom code is taken, and
    /// [`AppError::ResourceExhausted`] if no free code was found within the
    /// [`CodePolicy`] bounds.
    pub async fn create(&self, owner_id: i64, input: CreateShortUrl) -> Result<ShortUrl, AppError> {
        let original_url = check_url(&input.url)?;
        let title = normalize_title(input.title)?;
        let tags = normalize_tags(input.tags)?;

        let template = NewShortUrl {
            original_url,
            short_code: String::new(),
            user_id: owner_id,
            title,
            tags,
        };

        let created = match input.custom_code {
            Some(code) => self.create_with_custom_code(code, template).await?,
            None => self.create_with_generated_code(template).await?,
        };

        info!(
            short_code = %created.short_code,
            user_id = owner_id,
            "Short URL created"
        );

        Ok(created)
    }

    async fn create_with_custom_code(
        &self,
        code: String,
        template: NewShortUrl,
    ) -> Result<ShortUrl, AppError> {
        validate_custom_code(&code)?;

        let taken = bounded(
            self.store_timeout,
            "code_exists",
            self.repository.code_exists(&code),
        )
        .await?;

        if taken {
            return Err(code_in_use(&code));
        }

        let new_url = NewShortUrl {
            short_code: code.clone(),
            ..template
        };

        match bounded(self.store_timeout, "create", self.repository.create(new_url)).await {
            Err(e) if e.is_conflict() => Err(code_in_use(&code)),
            other => other,
        }
    }

    async fn create_with_generated_code(
        &self,
        template: NewShortUrl,
    ) -> Result<ShortUrl, AppError> {
        let policy = self.policy;

        for length in policy.initial_length..=policy.max_length {
            for _ in 0..policy.attempts_per_length {
                let code = generate_code(length);

                let taken = bounded(
                    self.store_timeout,
                    "code_exists",
                    self.repository.code_exists(&code),
                )
                .await?;

                if taken {
                    debug!(short_code = %code, length, "Generated code already in use");
                    continue;
                }

                let new_url = NewShortUrl {
                    short_code: code.clone(),
                    ..template.clone()
                };

                match bounded(self.store_timeout, "create", self.repository.create(new_url)).await
                {
                    Ok(created) => return Ok(created),
                    Err(e) if e.is_conflict() => {
                        debug!(short_code = %code, length, "Lost insert race for generated code");
                    }
                    Err(e) => return Err(e),
                }
            }

            debug!(length, "Widening generated codes");
        }

        warn!(
            initial_length = policy.initial_length,
            max_length = policy.max_length,
            attempts = policy.max_attempts(),
            "Short code space exhausted"
        );

        Err(AppError::resource_exhausted(
            "Could not allocate a unique short code",
            json!({
                "attempts": policy.max_attempts(),
                "max_length": policy.max_length,
            }),
        ))
    }

    /// Resolves a code to its target URL and counts the access.
    ///
    /// The counter update is best effort: if it fails for a reason other
    /// than the code being unknown, the failure is logged and the target is
    /// served from a plain lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match bounded(
            self.store_timeout,
            "record_access",
            self.repository.record_access(code),
        )
        .await
        {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(short_url_not_found(code)),
            Err(e) => {
                warn!(short_code = code, error = %e, "Failed to record access; serving redirect anyway");

                bounded(
                    self.store_timeout,
                    "find_by_code",
                    self.repository.find_by_code(code),
                )
                .await?
                .map(|url| url.original_url)
                .ok_or_else(|| short_url_not_found(code))
            }
        }
    }

    /// Returns the owner's record for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist or belongs
    /// to another user.
    pub async fn get_owned(&self, code: &str, owner_id: i64) -> Result<ShortUrl, AppError> {
        bounded(
            self.store_timeout,
            "find_owned",
            self.repository.find_owned(code, owner_id),
        )
        .await?
        .ok_or_else(|| short_url_not_found(code))
    }

    /// Updates the owner's record for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid input and
    /// [`AppError::NotFound`] if the owner has no record with this code.
    pub async fn update_owned(
        &self,
        code: &str,
        owner_id: i64,
        input: UpdateShortUrl,
    ) -> Result<ShortUrl, AppError> {
        let patch = ShortUrlPatch {
            original_url: check_url(&input.url)?,
            title: input.title.map(normalize_title).transpose()?,
            tags: input.tags.map(normalize_tags).transpose()?,
        };

        let updated = bounded(
            self.store_timeout,
            "update_owned",
            self.repository.update_owned(code, owner_id, patch),
        )
        .await?
        .ok_or_else(|| short_url_not_found(code))?;

        info!(short_code = code, user_id = owner_id, "Short URL updated");
        Ok(updated)
    }

    /// Deletes the owner's record for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the owner has no record with this code.
    pub async fn delete_owned(&self, code: &str, owner_id: i64) -> Result<(), AppError> {
        let deleted = bounded(
            self.store_timeout,
            "delete_owned",
            self.repository.delete_owned(code, owner_id),
        )
        .await?;

        if !deleted {
            return Err(short_url_not_found(code));
        }

        info!(short_code = code, user_id = owner_id, "Short URL deleted");
        Ok(())
    }

    /// Lists the owner's records, newest first.
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<ShortUrl>, AppError> {
        bounded(
            self.store_timeout,
            "list_by_owner",
            self.repository.list_by_owner(owner_id),
        )
        .await
    }

    /// Checks that the store answers within the timeout.
    pub async fn check_store(&self) -> Result<(), AppError> {
        bounded(self.store_timeout, "ping", self.repository.ping()).await
    }
}

fn short_url_not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}

fn code_in_use(code: &str) -> AppError {
    AppError::conflict("Short code already in use", json!({ "short_code": code }))
}

fn check_url(url: &str) -> Result<String, AppError> {
    validate_target_url(url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })
}

/// Trims a title; blank titles become `None`.
fn normalize_title(title: Option<String>) -> Result<Option<String>, AppError> {
    let Some(title) = title else {
        return Ok(None);
    };

    let title = title.trim();
    if title.is_empty() {
        return Ok(None);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::bad_request(
            "Title must be at most 100 characters",
            json!({ "max_length": MAX_TITLE_LENGTH }),
        ));
    }

    Ok(Some(title.to_string()))
}

/// Trims tags, drops blanks and duplicates, and enforces the stored format.
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }

        if tag.contains(crate::domain::entities::short_url::TAG_SEPARATOR) {
            return Err(AppError::bad_request(
                "Tags cannot contain commas",
                json!({ "tag": tag }),
            ));
        }

        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::bad_request(
                "Tag is too long",
                json!({ "tag": tag, "max_length": MAX_TAG_LENGTH }),
            ));
        }

        if !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }

    if normalized.len() > MAX_TAGS {
        return Err(AppError::bad_request(
            "Too many tags",
            json!({ "max_tags": MAX_TAGS }),
        ));
    }

    Ok(normalized)
}

/// Validates a policy loaded from configuration.
pub fn validate_policy(policy: &CodePolicy) -> Result<(), String> {
    if policy.initial_length < 3 || policy.initial_length > MAX_CUSTOM_CODE_LENGTH {
        return Err(format!(
            "initial code length must be between 3 and {}, got {}",
            MAX_CUSTOM_CODE_LENGTH, policy.initial_length
        ));
    }
    if policy.max_length < policy.initial_length || policy.max_length > MAX_STORED_CODE_LENGTH {
        return Err(format!(
            "max code length must be between {} and {}, got {}",
            policy.initial_length, MAX_STORED_CODE_LENGTH, policy.max_length
        ));
    }
    if policy.attempts_per_length == 0 {
        return Err("attempts per length must be at least 1".to_string());
    }
    Ok(())
}
