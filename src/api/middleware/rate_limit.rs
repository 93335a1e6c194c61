//! Per-IP rate limiting using a token bucket.

use anyhow::anyhow;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Sustained requests per second per client.
    pub per_second: u64,
    /// Requests a client may burst before throttling.
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_second: 2,
            burst: 50,
        }
    }
}

/// Creates a rate limiter keyed by the client's socket address.
///
/// One request is replenished every `1000 / per_second` milliseconds, up to
/// `burst` outstanding requests. Requests over the limit receive
/// `429 Too Many Requests`.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer address
/// is available.
///
/// # Errors
///
/// Returns an error if `per_second` or `burst` is zero.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/auth/login", post(login_handler))
///     .layer(rate_limit::layer(RateLimit::default())?);
/// ```
pub fn layer(
    limit: RateLimit,
) -> anyhow::Result<GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>>
{
    if limit.per_second == 0 {
        return Err(anyhow!("rate limit must allow at least one request per second"));
    }

    let period_ms = (1000 / limit.per_second).max(1);

    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(limit.burst)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: burst must be at least 1"))?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_accepts_defaults() {
        assert!(layer(RateLimit::default()).is_ok());
    }

    #[test]
    fn test_layer_rejects_zero() {
        assert!(
            layer(RateLimit {
                per_second: 0,
                burst: 10
            })
            .is_err()
        );
        assert!(
            layer(RateLimit {
                per_second: 2,
                burst: 0
            })
            .is_err()
        );
    }

    #[test]
    fn test_layer_accepts_high_rates() {
        assert!(
            layer(RateLimit {
                per_second: 5000,
                burst: 1
            })
            .is_ok()
        );
    }
}
