use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::AnthropicError;

/// Default Anthropic API base URL
pub const ANTHROPIC_DEFAULT_BASE: &str = "https://api.anthropic.com";
/// Default Anthropic API version
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Header name for Anthropic version
pub const HDR_ANTHROPIC_VERSION: &str = "anthropic-version";
/// Header name for Anthropic beta features
pub const HDR_ANTHROPIC_BETA: &str = "anthropic-beta";
/// Header name for API key authentication
pub const HDR_X_API_KEY: &str = "x-api-key";
/// Default number of unrecognized stream lines tolerated before aborting
pub const DEFAULT_EMPTY_MESSAGES_LIMIT: usize = 300;

/// Authentication method for Anthropic API
///
/// Credentials are held as [`SecretString`] and never printed by `Debug`.
#[derive(Clone)]
pub enum AnthropicAuth {
    /// API key authentication
    ApiKey(SecretString),
    /// Bearer token authentication
    Bearer(SecretString),
    /// Both API key and bearer token authentication
    Both {
        /// API key for x-api-key header
        api_key: SecretString,
        /// Bearer token for Authorization header
        bearer: SecretString,
    },
    /// No authentication configured
    None,
}

impl std::fmt::Debug for AnthropicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
            Self::Both { .. } => f
                .debug_struct("Both")
                .field("api_key", &"<redacted>")
                .field("bearer", &"<redacted>")
                .finish(),
            Self::None => f.write_str("None"),
        }
    }
}

fn is_blank(secret: &SecretString) -> bool {
    secret.expose_secret().trim().is_empty()
}

/// Knobs for the streaming message assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Unrecognized lines tolerated per stream; one more aborts it
    pub empty_messages_limit: usize,
    /// Treat end of stream without `message_stop` as an error
    pub require_message_stop: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            empty_messages_limit: DEFAULT_EMPTY_MESSAGES_LIMIT,
            require_message_stop: false,
        }
    }
}

/// Configuration for the Anthropic client
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    api_base: String,
    version: String,
    auth: AnthropicAuth,
    beta: Vec<String>,
    stream: StreamOptions,
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        let api_key = env_trimmed("ANTHROPIC_API_KEY").map(SecretString::from);
        let bearer = env_trimmed("ANTHROPIC_AUTH_TOKEN").map(SecretString::from);
        let api_base =
            env_trimmed("ANTHROPIC_BASE_URL").unwrap_or_else(|| ANTHROPIC_DEFAULT_BASE.into());

        let auth = match (api_key, bearer) {
            (Some(k), Some(t)) => AnthropicAuth::Both {
                api_key: k,
                bearer: t,
            },
            (Some(k), None) => AnthropicAuth::ApiKey(k),
            (None, Some(t)) => AnthropicAuth::Bearer(t),
            _ => AnthropicAuth::None,
        };

        Self {
            api_base,
            version: ANTHROPIC_VERSION.into(),
            auth,
            beta: vec![],
            stream: StreamOptions::default(),
        }
    }
}

impl AnthropicConfig {
    /// Creates a new configuration with default settings
    ///
    /// Attempts to read from environment variables:
    /// - `ANTHROPIC_API_KEY` for API key authentication
    /// - `ANTHROPIC_AUTH_TOKEN` for bearer token authentication
    /// - `ANTHROPIC_BASE_URL` for custom API base URL (defaults to `https://api.anthropic.com`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the Anthropic API version
    ///
    /// Default is `2023-06-01`
    #[must_use]
    pub fn with_version(mut self, v: impl Into<String>) -> Self {
        self.version = v.into();
        self
    }

    /// Sets API key authentication (`x-api-key` header)
    #[must_use]
    pub fn with_api_key(mut self, k: impl Into<String>) -> Self {
        self.auth = AnthropicAuth::ApiKey(SecretString::from(k.into()));
        self
    }

    /// Sets bearer token authentication (`Authorization: Bearer` header)
    #[must_use]
    pub fn with_bearer(mut self, t: impl Into<String>) -> Self {
        self.auth = AnthropicAuth::Bearer(SecretString::from(t.into()));
        self
    }

    /// Sends both the `x-api-key` and `Authorization: Bearer` headers
    #[must_use]
    pub fn with_both(mut self, api_key: impl Into<String>, bearer: impl Into<String>) -> Self {
        self.auth = AnthropicAuth::Both {
            api_key: SecretString::from(api_key.into()),
            bearer: SecretString::from(bearer.into()),
        };
        self
    }

    /// Sets custom beta feature strings
    ///
    /// These will be sent in the `anthropic-beta` header as a comma-separated list.
    #[must_use]
    pub fn with_beta<I, S>(mut self, beta: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.beta = beta.into_iter().map(Into::into).collect();
        self
    }

    /// Sets beta features using the `BetaFeature` enum
    #[must_use]
    pub fn with_beta_features<I: IntoIterator<Item = BetaFeature>>(mut self, features: I) -> Self {
        self.beta = features.into_iter().map(Into::<String>::into).collect();
        self
    }

    /// Sets how many unrecognized lines a stream may carry before it is aborted
    ///
    /// Default is 300.
    #[must_use]
    pub const fn with_empty_messages_limit(mut self, limit: usize) -> Self {
        self.stream.empty_messages_limit = limit;
        self
    }

    /// Makes a stream that ends without `message_stop` fail with
    /// [`AnthropicError::IncompleteStream`] instead of returning the partial message
    #[must_use]
    pub const fn with_require_message_stop(mut self, require: bool) -> Self {
        self.stream.require_message_stop = require;
        self
    }

    /// Returns the configured API base URL
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the configured beta feature strings
    #[must_use]
    pub fn beta(&self) -> &[String] {
        &self.beta
    }

    /// Validates that authentication credentials are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if neither API key nor bearer token is configured,
    /// or if the configured credentials are empty/whitespace-only.
    pub fn validate_auth(&self) -> Result<(), AnthropicError> {
        match &self.auth {
            AnthropicAuth::ApiKey(k) if !is_blank(k) => Ok(()),
            AnthropicAuth::Bearer(t) if !is_blank(t) => Ok(()),
            AnthropicAuth::Both { api_key, bearer } if !is_blank(api_key) && !is_blank(bearer) => {
                Ok(())
            }
            _ => Err(AnthropicError::Config(
                "Missing Anthropic credentials: set ANTHROPIC_API_KEY or ANTHROPIC_AUTH_TOKEN"
                    .into(),
            )),
        }
    }
}

fn api_key_value(k: &SecretString) -> Result<HeaderValue, AnthropicError> {
    HeaderValue::from_str(k.expose_secret().trim())
        .map_err(|_| AnthropicError::Config("Invalid x-api-key value".into()))
}

fn bearer_value(t: &SecretString) -> Result<HeaderValue, AnthropicError> {
    HeaderValue::from_str(&format!("Bearer {}", t.expose_secret().trim()))
        .map_err(|_| AnthropicError::Config("Invalid Authorization header".into()))
}

/// Configuration trait for the Anthropic client
///
/// Implement this trait to provide custom authentication and API configuration.
pub trait Config: Send + Sync {
    /// Returns HTTP headers to include in requests
    ///
    /// # Errors
    ///
    /// Returns an error if header values contain invalid characters.
    fn headers(&self) -> Result<HeaderMap, AnthropicError>;

    /// Constructs the full URL for an API endpoint
    fn url(&self, path: &str) -> String;

    /// Returns query parameters to include in requests
    fn query(&self) -> Vec<(&str, &str)>;

    /// Validates that authentication credentials are present.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication is not properly configured.
    fn validate_auth(&self) -> Result<(), AnthropicError>;

    /// Options applied to every streamed response
    fn stream_options(&self) -> StreamOptions {
        StreamOptions::default()
    }
}

impl Config for AnthropicConfig {
    fn headers(&self) -> Result<HeaderMap, AnthropicError> {
        let mut h = HeaderMap::new();

        h.insert(
            HDR_ANTHROPIC_VERSION,
            HeaderValue::from_str(&self.version)
                .map_err(|_| AnthropicError::Config("Invalid anthropic-version header".into()))?,
        );

        if !self.beta.is_empty() {
            let v = self.beta.join(",");
            h.insert(
                HDR_ANTHROPIC_BETA,
                HeaderValue::from_str(&v)
                    .map_err(|_| AnthropicError::Config("Invalid anthropic-beta header".into()))?,
            );
        }

        match &self.auth {
            AnthropicAuth::ApiKey(k) => {
                h.insert(HDR_X_API_KEY, api_key_value(k)?);
            }
            AnthropicAuth::Bearer(t) => {
                h.insert(AUTHORIZATION, bearer_value(t)?);
            }
            AnthropicAuth::Both { api_key, bearer } => {
                h.insert(HDR_X_API_KEY, api_key_value(api_key)?);
                h.insert(AUTHORIZATION, bearer_value(bearer)?);
            }
            AnthropicAuth::None => {}
        }

        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn query(&self) -> Vec<(&str, &str)> {
        vec![]
    }

    fn validate_auth(&self) -> Result<(), AnthropicError> {
        self.validate_auth()
    }

    fn stream_options(&self) -> StreamOptions {
        self.stream
    }
}

/// Known Anthropic beta features
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetaFeature {
    /// Prompt caching (2024-07-31)
    PromptCaching20240731,
    /// Extended cache TTL (2025-04-11)
    ExtendedCacheTtl20250411,
    /// Token counting (2024-11-01)
    TokenCounting20241101,
    /// Message batches (2024-09-24)
    MessageBatches20240924,
    /// Custom beta feature string
    Other(String),
}

impl From<BetaFeature> for String {
    fn from(b: BetaFeature) -> Self {
        match b {
            BetaFeature::PromptCaching20240731 => "prompt-caching-2024-07-31".into(),
            BetaFeature::ExtendedCacheTtl20250411 => "extended-cache-ttl-2025-04-11".into(),
            BetaFeature::TokenCounting20241101 => "token-counting-2024-11-01".into(),
            BetaFeature::MessageBatches20240924 => "message-batches-2024-09-24".into(),
            BetaFeature::Other(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers_exist() {
        let cfg = AnthropicConfig::new();
        let h = cfg.headers().unwrap();
        assert_eq!(h.get(HDR_ANTHROPIC_VERSION).unwrap(), ANTHROPIC_VERSION);
    }

    #[test]
    fn auth_header_selection() {
        let h = AnthropicConfig::new().with_api_key("k123").headers().unwrap();
        assert_eq!(h.get(HDR_X_API_KEY).unwrap(), "k123");
        assert!(!h.contains_key(AUTHORIZATION));

        let h = AnthropicConfig::new().with_bearer("t123").headers().unwrap();
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer t123");
        assert!(!h.contains_key(HDR_X_API_KEY));

        let h = AnthropicConfig::new()
            .with_both("k123", "t123")
            .headers()
            .unwrap();
        assert!(h.contains_key(HDR_X_API_KEY));
        assert!(h.contains_key(AUTHORIZATION));
    }

    #[test]
    fn beta_header_join() {
        let cfg = AnthropicConfig::new().with_beta_features([
            BetaFeature::MessageBatches20240924,
            BetaFeature::Other("custom-1".into()),
        ]);
        let h = cfg.headers().unwrap();
        let v = h.get(HDR_ANTHROPIC_BETA).unwrap().to_str().unwrap();
        assert_eq!(v, "message-batches-2024-09-24,custom-1");
    }

    #[test]
    fn invalid_header_values_error() {
        let cfg = AnthropicConfig::new().with_api_key("bad\nkey");
        match cfg.headers() {
            Err(AnthropicError::Config(msg)) => assert!(msg.contains("x-api-key")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let cfg = AnthropicConfig::new().with_api_base("http://localhost:1234/");
        assert_eq!(cfg.url("/v1/messages"), "http://localhost:1234/v1/messages");
    }

    #[test]
    fn stream_options_defaults_and_overrides() {
        let cfg = AnthropicConfig::new();
        assert_eq!(Config::stream_options(&cfg), StreamOptions::default());
        assert_eq!(
            Config::stream_options(&cfg).empty_messages_limit,
            DEFAULT_EMPTY_MESSAGES_LIMIT
        );

        let cfg = cfg
            .with_empty_messages_limit(5)
            .with_require_message_stop(true);
        let opts = Config::stream_options(&cfg);
        assert_eq!(opts.empty_messages_limit, 5);
        assert!(opts.require_message_stop);
    }

    #[test]
    fn validate_auth_missing() {
        let cfg = AnthropicConfig {
            api_base: "test".into(),
            version: "test".into(),
            auth: AnthropicAuth::None,
            beta: vec![],
            stream: StreamOptions::default(),
        };
        assert!(cfg.validate_auth().is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = AnthropicConfig::new().with_both("secret-api-key", "secret-bearer-token");
        let debug_str = format!("{cfg:?}");

        assert!(!debug_str.contains("secret-api-key"));
        assert!(!debug_str.contains("secret-bearer-token"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn validate_auth_rejects_blank_credentials() {
        for blank in ["", "   ", "\n"] {
            assert!(AnthropicConfig::new().with_api_key(blank).validate_auth().is_err());
            assert!(AnthropicConfig::new().with_bearer(blank).validate_auth().is_err());
            assert!(
                AnthropicConfig::new()
                    .with_both(blank, "valid-token")
                    .validate_auth()
                    .is_err()
            );
            assert!(
                AnthropicConfig::new()
                    .with_both("valid-key", blank)
                    .validate_auth()
                    .is_err()
            );
        }
    }

    #[test]
    fn validate_auth_accepts_valid_credentials() {
        assert!(AnthropicConfig::new().with_api_key("valid-key").validate_auth().is_ok());
        assert!(AnthropicConfig::new().with_bearer("valid-token").validate_auth().is_ok());
        assert!(
            AnthropicConfig::new()
                .with_both("valid-key", "valid-token")
                .validate_auth()
                .is_ok()
        );
        assert!(AnthropicConfig::new().with_api_key("  valid-key  ").validate_auth().is_ok());
    }
}
