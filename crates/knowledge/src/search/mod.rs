//! Search index backends.
//!
//! A backend executes one hybrid query and hands back the raw JSON body.
//! Interpreting that body (scores, ordering, confidence) is the
//! retriever's job, so every backend stays a thin transport.

pub mod azure;
pub mod mock;

pub use azure::AzureSearchBackend;
pub use mock::{MockSearchBackend, MockSearchReply};

use askdocs_core::config::SearchConfig;
use askdocs_core::{AppError, AppResult};
use serde_json::Value;
use std::sync::Arc;

/// A semantic query with an optional k-NN vector sub-query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Full-text search expression (the question)
    pub text: String,

    /// Name of the semantic ranking configuration on the index
    pub semantic_configuration: String,

    /// Page size
    pub top: usize,

    /// Fields returned for every document
    pub select: Vec<String>,

    /// Vector sub-query, present for vector-enabled indexes only
    pub vector: Option<VectorQuery>,
}

/// k-nearest-neighbour sub-query against a vector field.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub k: usize,
    pub fields: String,
}

/// Trait for search index backends.
///
/// Implementations must be `Send + Sync` so one instance can serve every
/// request.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name (e.g., "azure", "mock")
    fn provider_name(&self) -> &str;

    /// Index the queries run against
    fn index_name(&self) -> &str;

    /// Run `query` and return the response body as JSON.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status, or a body
    /// that is not JSON.
    async fn search(&self, query: &SearchQuery) -> AppResult<Value>;
}

/// Create the search backend from the `search` configuration section.
pub fn create_search_backend(config: &SearchConfig) -> AppResult<Arc<dyn SearchBackend>> {
    match config.provider.as_str() {
        "azure" => Ok(Arc::new(AzureSearchBackend::new(config)?)),
        "mock" => Ok(Arc::new(
            MockSearchBackend::default().with_index(config.index_name.clone()),
        )),
        other => Err(AppError::Config(format!(
            "Unknown search provider: {}. Supported: azure, mock",
            other
        ))),
    }
}
