//! Stage model seam
//!
//! The actual LLM/tool invocation per stage. The executor never retries a
//! stage; a model failure aborts the run tagged with the failing stage.

/// Stage model errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The provider rejected or failed the call
    #[error("model call failed: {0}")]
    Call(String),

    /// The provider rate-limited the call
    #[error("model rate limited: {0}")]
    RateLimited(String),
}

/// Runs one composed stage prompt against the model
#[async_trait::async_trait]
pub trait StageModel: Send + Sync {
    /// Execute the prompt, returning the raw response text
    ///
    /// The response may be free text or contain JSON; shape resolution
    /// happens at the executor boundary, not here.
    async fn run(&self, prompt: &str) -> Result<String, ModelError>;
}
