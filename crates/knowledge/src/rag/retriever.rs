//! Confidence-gated context retrieval.
//!
//! One hybrid query per question. The backend's document order is not
//! trusted: hits are re-sorted by reranker score before the context is
//! rendered, and only the first document in backend order decides whether
//! the result is confident enough to use at all.

use crate::embedding::EmbeddingGenerator;
use crate::search::{SearchBackend, SearchQuery, VectorQuery};
use crate::types::SearchHit;
use askdocs_core::config::SearchConfig;
use askdocs_core::{AppError, AppResult, RetrievalFailurePolicy};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Indexes whose name starts with this prefix carry a vector field.
pub const VECTOR_INDEX_PREFIX: &str = "vi-";

/// Semantic ranking configuration defined on every index.
pub const SEMANTIC_CONFIGURATION: &str = "mergenmarkdown-config";

/// Vector field queried on vector-enabled indexes.
pub const VECTOR_FIELD: &str = "contentVector";

/// Fields requested for every document.
pub const SELECT_FIELDS: [&str; 3] = ["sourceUrl", "content", "hierarchy"];

/// Score field added to each document by the semantic ranker.
pub const RERANKER_SCORE_FIELD: &str = "@search.rerankerScore";

/// First-hit reranker scores below this are not confident matches.
pub const RERANKER_CONFIDENCE_THRESHOLD: f64 = 1.0;

/// Context handed to the model when nothing confident was found.
pub const NO_INFORMATION_SENTINEL: &str = "No information was found. Answer the question with your \
general knowledge. Let the user know that you have not found any information in the knowledge \
base and are responding with your general knowledge from the internet.";

/// Builds the grounding context for one question.
pub struct SearchRetriever {
    backend: Arc<dyn SearchBackend>,
    embedder: EmbeddingGenerator,
    top_k: usize,
    failure_policy: RetrievalFailurePolicy,
}

impl SearchRetriever {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        embedder: EmbeddingGenerator,
        top_k: usize,
        failure_policy: RetrievalFailurePolicy,
    ) -> Self {
        Self {
            backend,
            embedder,
            top_k,
            failure_policy,
        }
    }

    /// Build from the `search` configuration section.
    pub fn from_config(
        backend: Arc<dyn SearchBackend>,
        embedder: EmbeddingGenerator,
        config: &SearchConfig,
    ) -> Self {
        Self::new(backend, embedder, config.top_k, config.failure_policy)
    }

    /// Whether queries attach a vector sub-query.
    pub fn uses_vector_search(&self) -> bool {
        self.backend.index_name().starts_with(VECTOR_INDEX_PREFIX)
    }

    /// Retrieve the context for `question`.
    ///
    /// Never fails: any error is logged and replaced according to the
    /// configured [`RetrievalFailurePolicy`].
    #[instrument(skip(self, question), fields(index = %self.backend.index_name(), top_k = self.top_k))]
    pub async fn retrieve(&self, question: &str) -> String {
        match self.try_retrieve(question).await {
            Ok(context) => context,
            Err(e) => {
                tracing::error!("Search retrieval failed: {}", e);
                match self.failure_policy {
                    RetrievalFailurePolicy::Empty => String::new(),
                    RetrievalFailurePolicy::Sentinel => NO_INFORMATION_SENTINEL.to_string(),
                }
            }
        }
    }

    async fn try_retrieve(&self, question: &str) -> AppResult<String> {
        let query = self.build_query(question).await?;
        let body = self.backend.search(&query).await?;
        let hits = parse_hits(&body)?;

        tracing::debug!(hits = hits.len(), "Search returned documents");

        Ok(render_context(hits, self.top_k))
    }

    async fn build_query(&self, question: &str) -> AppResult<SearchQuery> {
        let vector = if self.uses_vector_search() {
            Some(VectorQuery {
                vector: self.embedder.embed(question).await?,
                k: self.top_k,
                fields: VECTOR_FIELD.to_string(),
            })
        } else {
            None
        };

        Ok(SearchQuery {
            text: question.to_string(),
            semantic_configuration: SEMANTIC_CONFIGURATION.to_string(),
            top: self.top_k,
            select: SELECT_FIELDS.iter().map(|f| f.to_string()).collect(),
            vector,
        })
    }
}

/// Parse the `value` array of a search response, keeping backend order.
///
/// A missing `value` means no documents. The first document decides
/// confidence and must carry a finite reranker score; later documents
/// without a usable score are kept and ranked last. Text fields default
/// to empty.
pub fn parse_hits(body: &Value) -> AppResult<Vec<SearchHit>> {
    let documents = match body.get("value") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(documents)) => documents,
        Some(_) => {
            return Err(AppError::Search(
                "Search response `value` is not an array".to_string(),
            ))
        }
    };

    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let fields = doc.as_object().ok_or_else(|| {
                AppError::Search(format!("Search document {} is not an object", i))
            })?;

            let score = reranker_score(fields);
            if i == 0 && score.is_none() {
                return Err(AppError::Search(format!(
                    "First search document has no usable {}",
                    RERANKER_SCORE_FIELD
                )));
            }

            Ok(SearchHit {
                source_url: text_field(fields, "sourceUrl"),
                content: text_field(fields, "content"),
                hierarchy: text_field(fields, "hierarchy"),
                reranker_score: score,
            })
        })
        .collect()
}

fn text_field(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric or numeric-string score; NaN and infinities are not scores.
fn reranker_score(fields: &Map<String, Value>) -> Option<f64> {
    let score = match fields.get(RERANKER_SCORE_FIELD)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}

/// Gate on the first hit's confidence, then rank and render.
///
/// The result is either the sentinel or only hit blocks, never both.
pub fn render_context(mut hits: Vec<SearchHit>, top_k: usize) -> String {
    let first_score = match hits.first() {
        None => {
            tracing::info!("No documents found, using sentinel context");
            return NO_INFORMATION_SENTINEL.to_string();
        }
        Some(first) => first.reranker_score.unwrap_or(f64::NEG_INFINITY),
    };

    if first_score < RERANKER_CONFIDENCE_THRESHOLD {
        tracing::info!(
            "First document scored {:.3} (below {:.1}), using sentinel context",
            first_score,
            RERANKER_CONFIDENCE_THRESHOLD
        );
        return NO_INFORMATION_SENTINEL.to_string();
    }

    // Stable, so equal scores keep backend order; unscored hits go last
    hits.sort_by(|a, b| rank(b).total_cmp(&rank(a)));
    hits.truncate(top_k);

    hits.iter().map(format_hit).collect()
}

fn rank(hit: &SearchHit) -> f64 {
    hit.reranker_score.unwrap_or(f64::NEG_INFINITY)
}

fn format_hit(hit: &SearchHit) -> String {
    format!(
        "[Result]: <Title>{}</Title><Url>{}</Url>\n{}\n\n",
        hit.hierarchy, hit.source_url, hit.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{MockSearchBackend, MockSearchReply};
    use askdocs_llm::MockEmbeddingClient;
    use serde_json::json;

    fn hit(url: &str, score: f64) -> SearchHit {
        SearchHit {
            source_url: url.to_string(),
            content: format!("content of {}", url),
            hierarchy: format!("Docs > {}", url),
            reranker_score: Some(score),
        }
    }

    fn retriever(backend: Arc<MockSearchBackend>, policy: RetrievalFailurePolicy) -> SearchRetriever {
        SearchRetriever::new(
            backend,
            EmbeddingGenerator::new(Arc::new(MockEmbeddingClient::new(8))),
            3,
            policy,
        )
    }

    #[test]
    fn test_format_hit_block() {
        assert_eq!(
            format_hit(&hit("/a", 2.0)),
            "[Result]: <Title>Docs > /a</Title><Url>/a</Url>\ncontent of /a\n\n"
        );
    }

    #[test]
    fn test_no_hits_yields_sentinel() {
        assert_eq!(render_context(Vec::new(), 5), NO_INFORMATION_SENTINEL);
    }

    #[test]
    fn test_low_first_score_yields_sentinel() {
        // Later hits are confident, but only the first one counts
        let hits = vec![hit("/a", 0.99), hit("/b", 3.5), hit("/c", 2.0)];
        assert_eq!(render_context(hits, 5), NO_INFORMATION_SENTINEL);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let context = render_context(vec![hit("/a", 1.0)], 5);
        assert!(context.starts_with("[Result]: "));
    }

    #[test]
    fn test_hits_sorted_descending_and_truncated() {
        let hits = vec![
            hit("/a", 1.5),
            hit("/b", 3.0),
            hit("/c", 0.2),
            hit("/d", 2.5),
        ];
        let context = render_context(hits, 3);

        assert_eq!(context.matches("[Result]:").count(), 3);
        let b = context.find("<Url>/b</Url>").unwrap();
        let d = context.find("<Url>/d</Url>").unwrap();
        let a = context.find("<Url>/a</Url>").unwrap();
        assert!(b < d && d < a);
        assert!(!context.contains("/c"));
        assert!(!context.contains(NO_INFORMATION_SENTINEL));
    }

    #[test]
    fn test_equal_scores_keep_backend_order() {
        let context = render_context(vec![hit("/first", 2.0), hit("/second", 2.0)], 5);
        assert!(context.find("/first").unwrap() < context.find("/second").unwrap());
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({
            "@odata.context": "ignored",
            "value": [
                {
                    "sourceUrl": "/display/HR/Leave",
                    "content": "Annual leave is 14 days.",
                    "hierarchy": "HR > Leave",
                    "@search.rerankerScore": 2.75
                },
                {
                    "sourceUrl": null,
                    "content": 42,
                    "@search.rerankerScore": "1.25"
                }
            ]
        });

        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].hierarchy, "HR > Leave");
        assert_eq!(hits[0].reranker_score, Some(2.75));
        assert_eq!(hits[1].source_url, "");
        assert_eq!(hits[1].content, "42");
        assert_eq!(hits[1].hierarchy, "");
        assert_eq!(hits[1].reranker_score, Some(1.25));
    }

    #[test]
    fn test_parse_missing_value_is_empty() {
        assert!(parse_hits(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(parse_hits(&json!({ "value": "nope" })).is_err());
        assert!(parse_hits(&json!({ "value": [1] })).is_err());
        assert!(parse_hits(&json!({ "value": [{ "content": "no score" }] })).is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite_first_score() {
        for score in ["NaN", "inf", "-inf", "infinity"] {
            let body = json!({ "value": [{ "sourceUrl": "/a", "@search.rerankerScore": score }] });
            assert!(parse_hits(&body).is_err(), "accepted score {:?}", score);
        }
    }

    #[test]
    fn test_later_hits_without_score_rank_last() {
        let body = json!({
            "value": [
                { "sourceUrl": "/a", "@search.rerankerScore": 2.5 },
                { "sourceUrl": "/b" },
                { "sourceUrl": "/c", "@search.rerankerScore": "NaN" },
                { "sourceUrl": "/d", "@search.rerankerScore": 1.5 }
            ]
        });

        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits[1].reranker_score, None);
        assert_eq!(hits[2].reranker_score, None);

        let context = render_context(hits, 5);
        let a = context.find("<Url>/a</Url>").unwrap();
        let d = context.find("<Url>/d</Url>").unwrap();
        let b = context.find("<Url>/b</Url>").unwrap();
        let c = context.find("<Url>/c</Url>").unwrap();
        assert!(a < d && d < b && b < c);
    }

    #[tokio::test]
    async fn test_non_finite_first_score_is_a_failure() {
        let body = json!({ "value": [{ "sourceUrl": "/a", "@search.rerankerScore": "inf" }] });
        let backend = Arc::new(MockSearchBackend::new(MockSearchReply::Body(body)));

        let retriever = retriever(backend, RetrievalFailurePolicy::Empty);
        assert_eq!(retriever.retrieve("q").await, "");
    }

    #[tokio::test]
    async fn test_semantic_index_sends_no_vector() {
        let backend = Arc::new(MockSearchBackend::default().with_index("handbook"));
        let retriever = retriever(backend.clone(), RetrievalFailurePolicy::Empty);

        assert!(!retriever.uses_vector_search());
        retriever.retrieve("What is X?").await;

        let query = &backend.queries()[0];
        assert_eq!(query.text, "What is X?");
        assert_eq!(query.semantic_configuration, SEMANTIC_CONFIGURATION);
        assert_eq!(query.top, 3);
        assert_eq!(query.select, vec!["sourceUrl", "content", "hierarchy"]);
        assert!(query.vector.is_none());
    }

    #[tokio::test]
    async fn test_vector_index_sends_embedding() {
        let backend = Arc::new(MockSearchBackend::default().with_index("vi-handbook"));
        let retriever = retriever(backend.clone(), RetrievalFailurePolicy::Empty);

        retriever.retrieve("What is X?").await;

        let vector = backend.queries()[0].vector.clone().unwrap();
        assert_eq!(vector.k, 3);
        assert_eq!(vector.fields, "contentVector");
        assert_eq!(vector.vector.len(), 8);
    }

    #[tokio::test]
    async fn test_backend_failure_policies() {
        let failing =
            || Arc::new(MockSearchBackend::new(MockSearchReply::Transport("refused".to_string())));

        let empty = retriever(failing(), RetrievalFailurePolicy::Empty);
        assert_eq!(empty.retrieve("q").await, "");

        let sentinel = retriever(failing(), RetrievalFailurePolicy::Sentinel);
        assert_eq!(sentinel.retrieve("q").await, NO_INFORMATION_SENTINEL);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_recovered() {
        let backend = Arc::new(MockSearchBackend::default().with_index("vi-handbook"));
        let retriever = SearchRetriever::new(
            backend.clone(),
            EmbeddingGenerator::new(Arc::new(MockEmbeddingClient::failing())),
            3,
            RetrievalFailurePolicy::Empty,
        );

        assert_eq!(retriever.retrieve("q").await, "");
        assert!(backend.queries().is_empty());
    }
}
