//! Pipeline type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered when the caller's display name is unknown.
pub const ANONYMOUS_USER: &str = "UserName:";

/// One document returned by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Site-relative or absolute URL of the source page
    pub source_url: String,

    /// Passage text
    pub content: String,

    /// Breadcrumb of the page inside the documentation tree
    pub hierarchy: String,

    /// Semantic reranker score; higher is better. Only the first document
    /// is guaranteed to have one.
    pub reranker_score: Option<f64>,
}

/// Who asked the question. Only used for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Display name of the caller
    pub name: Option<String>,

    /// Opaque directory object id
    pub id: Option<String>,
}

impl UserIdentity {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}-{}", name, self.id.as_deref().unwrap_or_default()),
            None => f.write_str(ANONYMOUS_USER),
        }
    }
}
