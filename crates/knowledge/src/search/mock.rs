//! Mock search backend for offline runs and tests.

use super::{SearchBackend, SearchQuery};
use askdocs_core::{AppError, AppResult};
use serde_json::{json, Value};
use std::sync::Mutex;

/// What the mock backend answers with.
#[derive(Debug, Clone)]
pub enum MockSearchReply {
    /// Return this body verbatim
    Body(Value),
    /// Fail with this HTTP status and reason
    Status(u16, String),
    /// Fail without a status, like a refused connection
    Transport(String),
}

/// Scripted search backend that records every query it receives.
#[derive(Debug)]
pub struct MockSearchBackend {
    index_name: String,
    reply: MockSearchReply,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSearchBackend {
    pub fn new(reply: MockSearchReply) -> Self {
        Self {
            index_name: "mock-index".to_string(),
            reply,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answer with a `value` array holding `documents`.
    pub fn with_documents(documents: Vec<Value>) -> Self {
        Self::new(MockSearchReply::Body(json!({ "value": documents })))
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for MockSearchBackend {
    /// An index with no matching documents.
    fn default() -> Self {
        Self::with_documents(Vec::new())
    }
}

#[async_trait::async_trait]
impl SearchBackend for MockSearchBackend {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn search(&self, query: &SearchQuery) -> AppResult<Value> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        match &self.reply {
            MockSearchReply::Body(body) => Ok(body.clone()),
            MockSearchReply::Status(status, reason) => Err(AppError::Http {
                status: *status,
                reason: reason.clone(),
            }),
            MockSearchReply::Transport(message) => Err(AppError::Search(message.clone())),
        }
    }
}
