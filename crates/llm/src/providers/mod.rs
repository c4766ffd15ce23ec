//! Backend implementations of the client traits.

pub mod azure_openai;
pub mod mock;

pub use azure_openai::AzureOpenAiClient;
pub use mock::{MockChatClient, MockEmbeddingClient, MockReply};
