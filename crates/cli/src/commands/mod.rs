//! Command handlers for the askdocs CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod search;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;

use askdocs_core::{config::AppConfig, AppResult};
use askdocs_knowledge::{create_search_backend, Orchestrator};
use askdocs_llm::{create_chat_client, create_embedding_client};

/// Create the long-lived backend clients and wire the answer pipeline.
pub fn build_pipeline(config: &AppConfig) -> AppResult<Orchestrator> {
    let chat = create_chat_client(&config.openai)?;
    let embeddings = create_embedding_client(&config.openai)?;
    let search = create_search_backend(&config.search)?;

    tracing::debug!(
        chat = chat.provider_name(),
        embeddings = embeddings.model_name(),
        search = search.provider_name(),
        index = search.index_name(),
        "Created backend clients"
    );

    Orchestrator::from_config(config, chat, embeddings, search)
}
