//! Provider factory.
//!
//! Builds the long-lived chat and embedding clients from the `openai`
//! configuration section. Both clients are created once at start-up and
//! shared by every request.

use crate::client::{ChatClient, EmbeddingClient};
use crate::providers::{AzureOpenAiClient, MockChatClient, MockEmbeddingClient};
use crate::types::ProviderType;
use askdocs_core::config::OpenAiConfig;
use askdocs_core::{AppError, AppResult};
use std::sync::Arc;

/// Embedding dimensions produced by the mock provider.
const MOCK_EMBEDDING_DIMENSIONS: usize = 1536;

/// Create the chat completion client.
///
/// # Errors
/// Returns error if the provider is unknown or its credentials are missing.
pub fn create_chat_client(config: &OpenAiConfig) -> AppResult<Arc<dyn ChatClient>> {
    match resolve(&config.provider)? {
        ProviderType::AzureOpenAi => Ok(Arc::new(AzureOpenAiClient::new(config)?)),
        ProviderType::Mock => Ok(Arc::new(MockChatClient::default())),
    }
}

/// Create the embedding client.
pub fn create_embedding_client(config: &OpenAiConfig) -> AppResult<Arc<dyn EmbeddingClient>> {
    match resolve(&config.provider)? {
        ProviderType::AzureOpenAi => Ok(Arc::new(AzureOpenAiClient::new(config)?)),
        ProviderType::Mock => Ok(Arc::new(MockEmbeddingClient::new(
            MOCK_EMBEDDING_DIMENSIONS,
        ))),
    }
}

fn resolve(provider: &str) -> AppResult<ProviderType> {
    ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))
}
