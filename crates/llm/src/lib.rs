//! LLM integration crate for askdocs.
//!
//! Provider-agnostic abstractions for chat completion and embedding
//! backends, behind the `ChatClient` and `EmbeddingClient` traits.
//!
//! # Providers
//! - **Azure OpenAI**: chat completions and embeddings (default)
//! - **Mock**: deterministic offline provider
//!
//! # Example
//! ```no_run
//! use askdocs_llm::{ChatClient, ChatMessage, ChatRequest, CompletionConfig, MockChatClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockChatClient::default();
//! let request = ChatRequest::new(
//!     "gpt-35-turbo",
//!     vec![ChatMessage::user("Hello, world!")],
//!     CompletionConfig::new(800, 0.7),
//! );
//! let response = client.complete(&request).await?;
//! println!("{:?}", response.first_content());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatChoice, ChatClient, ChatRequest, ChatResponse, EmbeddingClient};
pub use factory::{create_chat_client, create_embedding_client};
pub use providers::{AzureOpenAiClient, MockChatClient, MockEmbeddingClient, MockReply};
pub use types::{ChatMessage, CompletionConfig, ProviderType, Role};
