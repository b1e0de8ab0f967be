use crate::{
    client::Client,
    config::Config,
    error::AnthropicError,
    types::complete::{CompleteRequest, CompleteResponse},
};

/// API resource for the legacy `/v1/complete` endpoint
pub struct Complete<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Complete<'c, C> {
    /// Creates a new Complete resource
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Create a text completion
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_tokens_to_sample` is 0
    /// - The request fails to send
    /// - The API returns an error
    pub async fn create(&self, req: CompleteRequest) -> Result<CompleteResponse, AnthropicError> {
        if req.max_tokens_to_sample == 0 {
            return Err(AnthropicError::Config(
                "max_tokens_to_sample must be greater than 0".into(),
            ));
        }
        self.client.post("/v1/complete", req).await
    }
}

impl<C: Config> crate::Client<C> {
    /// Returns the legacy Complete API resource
    #[must_use]
    pub const fn complete(&self) -> Complete<'_, C> {
        Complete::new(self)
    }
}
