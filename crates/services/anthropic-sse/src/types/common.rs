use serde::{Deserialize, Serialize};

/// Cache lifetime for prompt caching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheTtl {
    /// Five minutes (the default when no TTL is given)
    #[serde(rename = "5m")]
    FiveMinutes,
    /// One hour (requires the extended cache TTL beta)
    #[serde(rename = "1h")]
    OneHour,
}

/// Cache control marker attached to a content block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheControl {
    /// Cache type (always "ephemeral")
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional cache lifetime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<CacheTtl>,
}

impl CacheControl {
    /// Ephemeral cache entry with a five minute TTL
    #[must_use]
    pub fn ephemeral_5m() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: Some(CacheTtl::FiveMinutes),
        }
    }

    /// Ephemeral cache entry with a one hour TTL
    #[must_use]
    pub fn ephemeral_1h() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: Some(CacheTtl::OneHour),
        }
    }

    /// Ephemeral cache entry using the server default TTL
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: None,
        }
    }
}

/// Validate that when mixing TTLs, `OneHour` entries appear before `FiveMinutes`.
#[must_use]
pub fn validate_mixed_ttl_order(block_ttls: impl IntoIterator<Item = CacheTtl>) -> bool {
    let mut seen_5m = false;
    for ttl in block_ttls {
        match ttl {
            CacheTtl::OneHour if seen_5m => return false,
            CacheTtl::FiveMinutes => seen_5m = true,
            CacheTtl::OneHour => {}
        }
    }
    true
}

/// Token accounting for a message
///
/// `input_tokens` and the cache counters are fixed by `message_start`;
/// `output_tokens` is overwritten by every `message_delta` while streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Tokens written to the prompt cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
    /// Tokens served from the prompt cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
}

/// Request metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Opaque end-user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_ser_de() {
        let s = serde_json::to_string(&CacheTtl::FiveMinutes).unwrap();
        assert_eq!(s, r#""5m""#);
        let t: CacheTtl = serde_json::from_str(r#""1h""#).unwrap();
        assert_eq!(t, CacheTtl::OneHour);
    }

    #[test]
    fn cache_control_ser() {
        let s = serde_json::to_string(&CacheControl::ephemeral_5m()).unwrap();
        assert!(s.contains(r#""type":"ephemeral""#));
        assert!(s.contains(r#""ttl":"5m""#));

        let s = serde_json::to_string(&CacheControl::ephemeral()).unwrap();
        assert!(!s.contains("ttl"));
    }

    #[test]
    fn ordering_valid() {
        assert!(validate_mixed_ttl_order([
            CacheTtl::OneHour,
            CacheTtl::FiveMinutes
        ]));
        assert!(validate_mixed_ttl_order([CacheTtl::FiveMinutes]));
        assert!(validate_mixed_ttl_order([]));
        assert!(!validate_mixed_ttl_order([
            CacheTtl::FiveMinutes,
            CacheTtl::OneHour
        ]));
    }

    #[test]
    fn usage_tolerates_missing_counters() {
        let u: Usage = serde_json::from_str(r#"{"output_tokens":15}"#).unwrap();
        assert_eq!(u.output_tokens, Some(15));
        assert_eq!(u.input_tokens, None);
        assert_eq!(serde_json::to_string(&u).unwrap(), r#"{"output_tokens":15}"#);
    }
}
