//! Business logic services for the application layer.

pub mod auth_service;
pub mod short_url_service;

pub use auth_service::AuthService;
pub use short_url_service::{CodePolicy, ShortUrlService};

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Runs a store call with a deadline.
///
/// An expired deadline becomes [`AppError::Unavailable`]; the call's own
/// result is passed through otherwise.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(AppError::unavailable(
                "Storage is temporarily unavailable",
                json!({ "operation": operation, "reason": "timeout" }),
            ))
        }
    }
}
