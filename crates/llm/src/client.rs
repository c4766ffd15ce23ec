//! Client abstractions for chat completion and embedding backends.

use crate::types::{ChatMessage, CompletionConfig};
use askdocs_core::AppResult;
use serde::{Deserialize, Serialize};

/// Chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Deployment (model) identifier
    pub deployment: String,

    /// Ordered conversation, system message first
    pub messages: Vec<ChatMessage>,

    /// Sampling parameters
    pub config: CompletionConfig,
}

impl ChatRequest {
    pub fn new(
        deployment: impl Into<String>,
        messages: Vec<ChatMessage>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            deployment: deployment.into(),
            messages,
            config,
        }
    }
}

/// One candidate completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub content: String,
}

/// Successful chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model that generated the response
    pub model: String,

    /// Candidate completions in backend order
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.content.as_str())
    }
}

/// Trait for chat completion providers.
///
/// A non-success HTTP status must surface as `AppError::Http` so callers
/// can tell throttling apart from other failures.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Get the provider name (e.g., "azure-openai", "mock").
    fn provider_name(&self) -> &str;

    /// Perform a single non-streaming completion. Implementations do not retry.
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Get provider name
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}
