use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::{AnthropicConfig, Config};
use crate::error::{AnthropicError, deserialize_api_error, map_deser};
use crate::retry;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
// Long generations stream for minutes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Anthropic API client
///
/// The client is generic over a [`Config`] implementation that provides authentication
/// and API configuration.
#[derive(Debug, Clone)]
pub struct Client<C: Config> {
    http: reqwest::Client,
    config: C,
    backoff: ExponentialBuilder,
}

impl Client<AnthropicConfig> {
    /// Creates a new client with default configuration
    ///
    /// Uses environment variables for authentication:
    /// - `ANTHROPIC_API_KEY` for API key authentication
    /// - `ANTHROPIC_AUTH_TOKEN` for bearer token authentication
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AnthropicConfig::new())
    }
}

impl<C: Config + Default> Default for Client<C> {
    fn default() -> Self {
        Self::with_config(C::default())
    }
}

impl<C: Config> Client<C> {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest client cannot be built.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client"),
            config,
            backoff: retry::default_backoff_builder(),
        }
    }

    /// Replaces the HTTP client with a custom one
    ///
    /// Useful for setting custom timeouts, proxies, or other HTTP configuration.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the backoff configuration for retry logic
    ///
    /// Only non-streaming requests are retried.
    #[must_use]
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a reference to the client's configuration
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Request to `path` with the configured headers and query applied
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AnthropicError> {
        Ok(self
            .http
            .request(method, self.config.url(path))
            .headers(self.config.headers()?)
            .query(&self.config.query()))
    }

    pub(crate) async fn get<O: DeserializeOwned>(&self, path: &str) -> Result<O, AnthropicError> {
        self.execute_json(|| Ok(self.request(Method::GET, path)?.build()?))
            .await
    }

    pub(crate) async fn get_with_query<Q, O>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<O, AnthropicError>
    where
        Q: Serialize + Sync + ?Sized,
        O: DeserializeOwned,
    {
        self.execute_json(|| Ok(self.request(Method::GET, path)?.query(query).build()?))
            .await
    }

    /// GET returning the raw body, for non-JSON payloads such as JSONL
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Bytes, AnthropicError> {
        self.config.validate_auth()?;
        self.execute(|| Ok(self.request(Method::GET, path)?.build()?))
            .await
    }

    pub(crate) async fn post<I, O>(&self, path: &str, body: I) -> Result<O, AnthropicError>
    where
        I: Serialize + Send + Sync,
        O: DeserializeOwned,
    {
        self.execute_json(|| Ok(self.request(Method::POST, path)?.json(&body).build()?))
            .await
    }

    /// POST without a request body
    pub(crate) async fn post_empty<O: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<O, AnthropicError> {
        self.execute_json(|| Ok(self.request(Method::POST, path)?.build()?))
            .await
    }

    /// Sends a POST request and returns the raw response for streaming.
    ///
    /// Never retried: a partly read event stream cannot be replayed. A non-2xx
    /// status is turned into an error before any of the body reaches the caller.
    pub(crate) async fn post_stream<I: Serialize + Send + Sync>(
        &self,
        path: &str,
        body: I,
    ) -> Result<reqwest::Response, AnthropicError> {
        self.config.validate_auth()?;

        let request = self
            .request(Method::POST, path)?
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&body)
            .build()?;
        let response = self.http.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        Err(deserialize_api_error(status, &headers, &bytes))
    }

    async fn execute_json<O, M>(&self, mk: M) -> Result<O, AnthropicError>
    where
        O: DeserializeOwned,
        M: Fn() -> Result<reqwest::Request, AnthropicError> + Sync,
    {
        self.config.validate_auth()?;

        let bytes = self.execute(mk).await?;
        serde_json::from_slice(&bytes).map_err(|e| map_deser(&e, &bytes))
    }

    /// Send the request built by `mk`, rebuilding it for each retry
    async fn execute<M>(&self, mk: M) -> Result<Bytes, AnthropicError>
    where
        M: Fn() -> Result<reqwest::Request, AnthropicError> + Sync,
    {
        (|| async {
            let response = self.http.execute(mk()?).await?;

            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.bytes().await?;

            if status.is_success() {
                Ok(bytes)
            } else {
                Err(deserialize_api_error(status, &headers, &bytes))
            }
        })
        .retry(self.backoff)
        .when(AnthropicError::is_retryable)
        .notify(|err, dur| {
            tracing::debug!(error = %err, delay = ?dur, "retrying request");
        })
        .await
    }
}
