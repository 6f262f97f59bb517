use std::time::Duration;

use http::Method;

const RETRY_BACKOFF_BASE_MS: u64 = 200;

/// Status codes the gateway treats as transient: worth retrying when the
/// retry budget and idempotency rules allow it.
#[inline]
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Whether a method is safe to retry without caller opt-in.
#[inline]
#[must_use]
pub fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Default backoff: exponential with a 200 ms base. Attempt 0 sleeps the
/// base; attempt n ≥ 1 sleeps base × 2ⁿ.
#[inline]
#[must_use]
pub fn default_backoff(attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(RETRY_BACKOFF_BASE_MS);
    }
    let shift = attempt.min(10);
    Duration::from_millis(RETRY_BACKOFF_BASE_MS.saturating_mul(1 << shift))
}
