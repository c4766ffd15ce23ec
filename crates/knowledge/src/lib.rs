//! Knowledge retrieval and answering for askdocs.
//!
//! Answers questions from an Azure AI Search index: the question is
//! embedded, matched with a hybrid semantic and vector query, gated on
//! reranker confidence and handed to the chat model as grounding context.
//!
//! # Example
//! ```no_run
//! use askdocs_core::config::AppConfig;
//! use askdocs_knowledge::{create_search_backend, Orchestrator, UserIdentity};
//! use askdocs_llm::{create_chat_client, create_embedding_client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let pipeline = Orchestrator::from_config(
//!     &config,
//!     create_chat_client(&config.openai)?,
//!     create_embedding_client(&config.openai)?,
//!     create_search_backend(&config.search)?,
//! )?;
//! let answer = pipeline
//!     .answer("How many days of annual leave do I get?", &UserIdentity::anonymous())
//!     .await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod rag;
pub mod search;
pub mod types;

#[cfg(test)]
mod tests;

pub use embedding::EmbeddingGenerator;
pub use rag::{
    AnswerGenerator, LinkRewriter, Orchestrator, SearchRetriever, NO_INFORMATION_SENTINEL,
    THROTTLED_MESSAGE,
};
pub use search::{create_search_backend, SearchBackend, SearchQuery};
pub use types::{SearchHit, UserIdentity};
