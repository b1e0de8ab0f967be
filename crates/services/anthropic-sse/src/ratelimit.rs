//! Rate-limit headers attached to every API response.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AnthropicError;

/// Request quota for the current window
pub const HDR_REQUESTS_LIMIT: &str = "anthropic-ratelimit-requests-limit";
/// Requests left in the current window
pub const HDR_REQUESTS_REMAINING: &str = "anthropic-ratelimit-requests-remaining";
/// When the request window resets (RFC 3339)
pub const HDR_REQUESTS_RESET: &str = "anthropic-ratelimit-requests-reset";
/// Token quota for the current window
pub const HDR_TOKENS_LIMIT: &str = "anthropic-ratelimit-tokens-limit";
/// Tokens left in the current window, rounded to the nearest thousand
pub const HDR_TOKENS_REMAINING: &str = "anthropic-ratelimit-tokens-remaining";
/// When the token window resets (RFC 3339)
pub const HDR_TOKENS_RESET: &str = "anthropic-ratelimit-tokens-reset";

/// Parsed rate-limit state of the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Maximum requests in the window
    pub requests_limit: u64,
    /// Requests remaining in the window
    pub requests_remaining: u64,
    /// When the request window resets
    pub requests_reset: DateTime<Utc>,
    /// Maximum tokens in the window
    pub tokens_limit: u64,
    /// Tokens remaining in the window
    pub tokens_remaining: u64,
    /// When the token window resets
    pub tokens_reset: DateTime<Utc>,
    /// Server-requested wait, only present on 429 responses
    pub retry_after: Option<Duration>,
}

impl RateLimitHeaders {
    /// Parses the rate-limit headers of a response
    ///
    /// All six `anthropic-ratelimit-*` headers are required. Every missing or
    /// malformed header is reported in a single [`AnthropicError::InvalidHeader`].
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AnthropicError> {
        let mut errs = Vec::new();

        let parsed = Self {
            requests_limit: required(headers, HDR_REQUESTS_LIMIT, &mut errs),
            requests_remaining: required(headers, HDR_REQUESTS_REMAINING, &mut errs),
            requests_reset: required_time(headers, HDR_REQUESTS_RESET, &mut errs),
            tokens_limit: required(headers, HDR_TOKENS_LIMIT, &mut errs),
            tokens_remaining: required(headers, HDR_TOKENS_REMAINING, &mut errs),
            tokens_reset: required_time(headers, HDR_TOKENS_RESET, &mut errs),
            retry_after: crate::retry::parse_retry_after(headers),
        };

        if errs.is_empty() {
            Ok(parsed)
        } else {
            Err(AnthropicError::InvalidHeader(errs.join("; ")))
        }
    }
}

fn header_str<'h>(headers: &'h HeaderMap, key: &str, errs: &mut Vec<String>) -> Option<&'h str> {
    match headers.get(key).map(|v| v.to_str()) {
        Some(Ok(s)) => Some(s.trim()),
        Some(Err(e)) => {
            errs.push(format!("failed to parse {key}: {e}"));
            None
        }
        None => {
            errs.push(format!("missing {key}"));
            None
        }
    }
}

fn required<T: FromStr + Default>(headers: &HeaderMap, key: &str, errs: &mut Vec<String>) -> T
where
    T::Err: std::fmt::Display,
{
    let Some(s) = header_str(headers, key, errs) else {
        return T::default();
    };
    s.parse().unwrap_or_else(|e| {
        errs.push(format!("failed to parse {key}: {e}"));
        T::default()
    })
}

fn required_time(headers: &HeaderMap, key: &str, errs: &mut Vec<String>) -> DateTime<Utc> {
    let Some(s) = header_str(headers, key, errs) else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };
    DateTime::parse_from_rfc3339(s).map_or_else(
        |e| {
            errs.push(format!("failed to parse {key}: {e}"));
            DateTime::<Utc>::UNIX_EPOCH
        },
        |t| t.with_timezone(&Utc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(HDR_REQUESTS_LIMIT, "100".parse().unwrap());
        h.insert(HDR_REQUESTS_REMAINING, "99".parse().unwrap());
        h.insert(HDR_REQUESTS_RESET, "2024-06-04T07:13:19Z".parse().unwrap());
        h.insert(HDR_TOKENS_LIMIT, "10000".parse().unwrap());
        h.insert(HDR_TOKENS_REMAINING, "9000".parse().unwrap());
        h.insert(HDR_TOKENS_RESET, "2024-06-04T07:13:19Z".parse().unwrap());
        h
    }

    #[test]
    fn parses_all_headers() {
        let mut h = full_headers();
        h.insert("retry-after", "10".parse().unwrap());
        let rl = RateLimitHeaders::from_headers(&h).unwrap();
        assert_eq!(rl.requests_limit, 100);
        assert_eq!(rl.requests_remaining, 99);
        assert_eq!(rl.tokens_remaining, 9000);
        assert_eq!(rl.requests_reset.to_rfc3339(), "2024-06-04T07:13:19+00:00");
        assert_eq!(rl.retry_after, Some(Duration::from_secs(10)));
    }

    #[test]
    fn retry_after_is_optional() {
        let rl = RateLimitHeaders::from_headers(&full_headers()).unwrap();
        assert_eq!(rl.retry_after, None);
    }

    #[test]
    fn reports_every_failure() {
        let mut h = full_headers();
        h.remove(HDR_TOKENS_LIMIT);
        h.insert(HDR_REQUESTS_REMAINING, "lots".parse().unwrap());
        h.insert(HDR_TOKENS_RESET, "tomorrow".parse().unwrap());
        match RateLimitHeaders::from_headers(&h) {
            Err(AnthropicError::InvalidHeader(msg)) => {
                assert!(msg.contains(HDR_TOKENS_LIMIT));
                assert!(msg.contains(HDR_REQUESTS_REMAINING));
                assert!(msg.contains(HDR_TOKENS_RESET));
                assert!(!msg.contains(HDR_REQUESTS_LIMIT));
            }
            other => panic!("Expected InvalidHeader, got {other:?}"),
        }
    }
}
