use crate::{
    client::Client,
    config::Config,
    error::AnthropicError,
    resources::messages::validate_messages_create_request,
    types::batches::{BatchCreateRequest, BatchList, BatchListParams, BatchResult, MessageBatch},
};

const BATCHES_PATH: &str = "/v1/messages/batches";

/// API resource for the `/v1/messages/batches` endpoints
///
/// Batches run many message requests asynchronously. The `message-batches`
/// beta must be enabled on the config (see [`crate::BetaFeature`]).
pub struct Batches<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Batches<'c, C> {
    /// Creates a new Batches resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Submit a batch
    ///
    /// Every request is validated like [`crate::resources::Messages::create`];
    /// streaming is switched off for all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batch is empty or any request is invalid
    /// - The request fails to send
    /// - The API returns an error
    pub async fn create(&self, mut req: BatchCreateRequest) -> Result<MessageBatch, AnthropicError> {
        if req.requests.is_empty() {
            return Err(AnthropicError::Config(
                "Batch must contain at least one request".into(),
            ));
        }
        for item in &mut req.requests {
            item.params.stream = None;
            validate_messages_create_request(&item.params).map_err(|e| {
                AnthropicError::Config(format!("request {}: {e}", item.custom_id))
            })?;
        }
        self.client.post(BATCHES_PATH, req).await
    }

    /// Fetch a batch by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn retrieve(&self, batch_id: &str) -> Result<MessageBatch, AnthropicError> {
        self.client.get(&format!("{BATCHES_PATH}/{batch_id}")).await
    }

    /// List batches, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `limit` is outside 1..=100
    /// - The request fails to send
    /// - The API returns an error
    pub async fn list(&self, params: &BatchListParams) -> Result<BatchList, AnthropicError> {
        params.validate()?;
        self.client.get_with_query(BATCHES_PATH, params).await
    }

    /// Request cancellation of a batch
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn cancel(&self, batch_id: &str) -> Result<MessageBatch, AnthropicError> {
        self.client
            .post_empty(&format!("{BATCHES_PATH}/{batch_id}/cancel"))
            .await
    }

    /// Download the results of an ended batch
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error, or a
    /// line of the results file cannot be parsed.
    pub async fn results(&self, batch_id: &str) -> Result<Vec<BatchResult>, AnthropicError> {
        let body = self
            .client
            .get_bytes(&format!("{BATCHES_PATH}/{batch_id}/results"))
            .await?;
        BatchResult::parse_jsonl(&body)
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the Message Batches API resource
    #[must_use]
    pub const fn batches(&self) -> Batches<'_, C> {
        Batches::new(self)
    }
}
