use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::messages::{MessagesCreateRequest, MessagesCreateResponse};
use crate::error::{AnthropicError, ErrorResponse};

/// One request inside a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchRequestItem {
    /// Caller-chosen ID used to match results to requests
    pub custom_id: String,
    /// Messages request to run
    pub params: MessagesCreateRequest,
}

/// Request to create a message batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BatchCreateRequest {
    /// Requests in the batch
    pub requests: Vec<BatchRequestItem>,
}

/// Processing state of a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Requests are still being processed
    InProgress,
    /// Cancellation was requested and is in progress
    Canceling,
    /// Every request has a result
    Ended,
}

/// Per-outcome request tallies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RequestCounts {
    /// Still processing
    pub processing: u64,
    /// Completed successfully
    pub succeeded: u64,
    /// Failed
    pub errored: u64,
    /// Canceled before processing
    pub canceled: u64,
    /// Expired before processing
    pub expired: u64,
}

/// A message batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBatch {
    /// Batch ID
    pub id: String,
    /// Object type (always "`message_batch`")
    #[serde(rename = "type")]
    pub kind: String,
    /// Processing state
    pub processing_status: ProcessingStatus,
    /// Request tallies
    pub request_counts: RequestCounts,
    /// When processing ended
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// When the batch was created
    pub created_at: DateTime<Utc>,
    /// When unprocessed requests expire
    pub expires_at: DateTime<Utc>,
    /// When the results were archived
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    /// When cancellation was requested
    #[serde(default)]
    pub cancel_initiated_at: Option<DateTime<Utc>>,
    /// Where results can be downloaded once ended
    #[serde(default)]
    pub results_url: Option<String>,
}

/// A page of batches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchList {
    /// Batches on this page
    pub data: Vec<MessageBatch>,
    /// Whether more pages exist
    pub has_more: bool,
    /// First ID on this page, for `before_id` paging
    #[serde(default)]
    pub first_id: Option<String>,
    /// Last ID on this page, for `after_id` paging
    #[serde(default)]
    pub last_id: Option<String>,
}

/// Query parameters for listing batches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BatchListParams {
    /// Return batches before this ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    /// Return batches after this ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
    /// Page size, 1 to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BatchListParams {
    /// Checks the page size bounds
    pub fn validate(&self) -> Result<(), AnthropicError> {
        match self.limit {
            Some(limit) if !(1..=100).contains(&limit) => Err(AnthropicError::Config(format!(
                "Invalid limit {limit}: must be between 1 and 100"
            ))),
            _ => Ok(()),
        }
    }
}

/// Outcome of one batch request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchResultKind {
    /// The request produced a message
    Succeeded {
        /// The generated message
        message: MessagesCreateResponse,
    },
    /// The request failed
    Errored {
        /// Error envelope
        error: ErrorResponse,
    },
    /// The batch was canceled before this request ran
    Canceled,
    /// The batch expired before this request ran
    Expired,
}

/// One line of a batch results file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResult {
    /// ID given when the batch was created
    pub custom_id: String,
    /// Outcome
    pub result: BatchResultKind,
}

impl BatchResult {
    /// Parses a JSONL results body. Results are not ordered like the requests.
    pub fn parse_jsonl(body: &[u8]) -> Result<Vec<Self>, AnthropicError> {
        body.split(|b| *b == b'\n')
            .filter(|line| !line.trim_ascii().is_empty())
            .map(|line| serde_json::from_slice(line).map_err(|e| crate::error::map_deser(&e, line)))
            .collect()
    }
}
