use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::messages::MessagesCreateResponse;

/// Header carrying the server-assigned request ID
pub const HDR_REQUEST_ID: &str = "request-id";

/// Errors that can occur when using the Anthropic API client
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// HTTP request error, including body read failures mid-stream
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Read error from a caller-supplied byte stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API error returned by Anthropic, as an HTTP error body or an SSE `error` event
    #[error("API error: {0}")]
    Api(ApiErrorObject),

    /// Configuration error (e.g., missing credentials, invalid request parameters)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(String),

    /// One or more response headers were missing or unparseable
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The stream produced more unrecognized lines than the configured limit
    #[error("stream has sent too many empty messages (limit {limit})")]
    TooManyEmptyStreamMessages {
        /// Configured limit that was exceeded
        limit: usize,
    },

    /// The stream ended before `message_stop` while strict termination was requested
    #[error("stream ended before message_stop")]
    IncompleteStream,

    /// A streamed message failed part-way; the content assembled so far is kept
    #[error("stream interrupted: {source}")]
    StreamInterrupted {
        /// What stopped the stream
        source: Box<AnthropicError>,
        /// Message as assembled up to the failure
        partial: Box<MessagesCreateResponse>,
    },
}

impl AnthropicError {
    /// Determines if this error is retryable
    ///
    /// Retryable errors include rate limits (429), timeouts (408), conflicts (409),
    /// server errors (5xx) and overload (529). Streaming failures are never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(obj) => obj
                .status_code
                .is_some_and(crate::retry::is_retryable_status),
            Self::Reqwest(e) => e.is_timeout() || e.is_connect(),
            Self::Io(_)
            | Self::Config(_)
            | Self::Serde(_)
            | Self::InvalidHeader(_)
            | Self::TooManyEmptyStreamMessages { .. }
            | Self::IncompleteStream
            | Self::StreamInterrupted { .. } => false,
        }
    }

    /// The underlying error, looking through [`AnthropicError::StreamInterrupted`]
    #[must_use]
    pub fn cause(&self) -> &Self {
        match self {
            Self::StreamInterrupted { source, .. } => source.cause(),
            other => other,
        }
    }

    /// The partially assembled message of an interrupted stream
    #[must_use]
    pub fn partial_message(&self) -> Option<&MessagesCreateResponse> {
        match self {
            Self::StreamInterrupted { partial, .. } => Some(&**partial),
            _ => None,
        }
    }

    /// The API error object, if the cause is an API error
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiErrorObject> {
        match self.cause() {
            Self::Api(obj) => Some(obj),
            _ => None,
        }
    }

    pub(crate) fn interrupted(source: Self, partial: MessagesCreateResponse) -> Self {
        Self::StreamInterrupted {
            source: Box::new(source),
            partial: Box::new(partial),
        }
    }
}

/// API error object from Anthropic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorObject {
    /// Error type string (e.g. `overloaded_error`)
    pub r#type: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Server request ID, when the response carried one
    pub request_id: Option<String>,
    /// HTTP status code; `None` for errors delivered inside a stream
    pub status_code: Option<u16>,
}

impl std::fmt::Display for ApiErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.r#type {
            Some(t) => write!(f, "{t}: {}", self.message)?,
            None => f.write_str(&self.message)?,
        }
        if let Some(id) = &self.request_id {
            write!(f, " (request-id {id})")?;
        }
        Ok(())
    }
}

impl ApiErrorObject {
    fn is_type(&self, t: &str) -> bool {
        self.r#type.as_deref() == Some(t)
    }

    /// `invalid_request_error`: malformed or unsupported request
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        self.is_type("invalid_request_error")
    }

    /// `authentication_error`: bad or missing credentials
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        self.is_type("authentication_error")
    }

    /// `permission_error`: credentials lack access to the resource
    #[must_use]
    pub fn is_permission(&self) -> bool {
        self.is_type("permission_error")
    }

    /// `not_found_error`
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.is_type("not_found_error")
    }

    /// `request_too_large`
    #[must_use]
    pub fn is_too_large(&self) -> bool {
        self.is_type("request_too_large")
    }

    /// `rate_limit_error`
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        self.is_type("rate_limit_error")
    }

    /// `api_error`: unexpected server-side failure
    #[must_use]
    pub fn is_api_error(&self) -> bool {
        self.is_type("api_error")
    }

    /// `overloaded_error`
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.is_type("overloaded_error")
    }
}

/// Error payload as sent on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorDetail {
    /// Error type string
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

/// `{"type":"error","error":{...}}` envelope used by error bodies and SSE error events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Envelope type (always "error")
    #[serde(rename = "type", default = "error_type")]
    pub kind: String,
    /// The error
    pub error: ApiErrorDetail,
}

fn error_type() -> String {
    "error".to_string()
}

impl From<ApiErrorDetail> for ApiErrorObject {
    fn from(detail: ApiErrorDetail) -> Self {
        Self {
            r#type: Some(detail.kind),
            message: detail.message,
            request_id: None,
            status_code: None,
        }
    }
}

/// Maps a serde deserialization error to an `AnthropicError` with context
#[must_use]
pub fn map_deser(e: &serde_json::Error, body: &[u8]) -> AnthropicError {
    let snippet = String::from_utf8_lossy(&body[..body.len().min(400)]).to_string();
    AnthropicError::Serde(format!("{e}: {snippet}"))
}

/// Deserializes an API error from a non-2xx response
///
/// Attempts to parse the error envelope, falling back to plain text on failure.
#[must_use]
pub fn deserialize_api_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> AnthropicError {
    let status_code = Some(status.as_u16());
    let request_id = headers
        .get(HDR_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Ok(envelope) = serde_json::from_slice::<ErrorResponse>(body) {
        let mut obj = ApiErrorObject::from(envelope.error);
        obj.status_code = status_code;
        obj.request_id = request_id;
        return AnthropicError::Api(obj);
    }

    // Server may return plain text on 5xx; cap body to avoid log/memory bloat
    AnthropicError::Api(ApiErrorObject {
        r#type: Some(format!("http_{}", status.as_u16())),
        message: String::from_utf8_lossy(&body[..body.len().min(400)]).into_owned(),
        request_id,
        status_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(kind: &str) -> ApiErrorObject {
        ApiErrorObject {
            r#type: Some(kind.into()),
            message: "m".into(),
            request_id: None,
            status_code: None,
        }
    }

    #[test]
    fn exactly_one_type_helper_matches() {
        let kinds = [
            "invalid_request_error",
            "authentication_error",
            "permission_error",
            "not_found_error",
            "request_too_large",
            "rate_limit_error",
            "api_error",
            "overloaded_error",
        ];
        for kind in kinds {
            let e = api(kind);
            let hits = [
                e.is_invalid_request(),
                e.is_authentication(),
                e.is_permission(),
                e.is_not_found(),
                e.is_too_large(),
                e.is_rate_limit(),
                e.is_api_error(),
                e.is_overloaded(),
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "{kind}");
        }
        let unknown = api("something_new");
        assert!(!unknown.is_api_error() && !unknown.is_overloaded());
    }

    #[test]
    fn envelope_body_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(HDR_REQUEST_ID, "req_123".parse().unwrap());
        let body = br#"{"type":"error","error":{"type":"not_found_error","message":"no such model"}}"#;
        let err = deserialize_api_error(StatusCode::NOT_FOUND, &headers, body);
        let obj = err.api_error().unwrap();
        assert!(obj.is_not_found());
        assert_eq!(obj.message, "no such model");
        assert_eq!(obj.status_code, Some(404));
        assert_eq!(obj.request_id.as_deref(), Some("req_123"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn plain_text_body_falls_back() {
        let body = "x".repeat(1000);
        let err = deserialize_api_error(
            StatusCode::BAD_GATEWAY,
            &HeaderMap::new(),
            body.as_bytes(),
        );
        let obj = err.api_error().unwrap();
        assert_eq!(obj.r#type.as_deref(), Some("http_502"));
        assert_eq!(obj.message.len(), 400);
        assert!(err.is_retryable());
    }

    #[test]
    fn interrupted_exposes_cause_and_partial() {
        let partial = MessagesCreateResponse {
            id: "msg_1".into(),
            ..Default::default()
        };
        let err = AnthropicError::interrupted(AnthropicError::Api(api("overloaded_error")), partial);
        assert!(err.api_error().is_some_and(ApiErrorObject::is_overloaded));
        assert_eq!(err.partial_message().map(|m| m.id.as_str()), Some("msg_1"));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("overloaded_error"));
    }
}
