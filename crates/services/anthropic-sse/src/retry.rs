use backon::ExponentialBuilder;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Creates the default exponential backoff builder for non-streaming requests
///
/// Configured with:
/// - Initial interval: 500ms
/// - Max interval: 8s
/// - Max times: 6
/// - Factor: 2.0
/// - Jitter enabled
#[must_use]
pub fn default_backoff_builder() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8))
        .with_max_times(6)
        .with_factor(2.0)
        .with_jitter()
}

/// Determines if an HTTP status code should trigger a retry
///
/// Retries on: 408, 409, 429, 5xx, and 529 (overloaded)
#[must_use]
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 409 | 429 | 500..=599) || code == 529
}

/// Parses the `retry-after-ms` or `retry-after` header
///
/// Returns the duration the server asked callers to wait, capped at 60 seconds.
/// Returns `None` if the header is missing or malformed.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(v) = headers.get("retry-after-ms")
        && let Ok(s) = v.to_str()
        && let Ok(ms) = s.trim().parse::<u64>()
    {
        return Some(Duration::from_millis(ms.min(60_000)));
    }

    if let Some(v) = headers.get("retry-after")
        && let Ok(s) = v.to_str()
        && let Ok(secs) = s.trim().parse::<u64>()
    {
        return Some(Duration::from_secs(secs.min(60)));
    }

    None
}
