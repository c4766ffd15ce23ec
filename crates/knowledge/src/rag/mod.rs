//! RAG (Retrieval-Augmented Generation) answering pipeline.
//!
//! Grounds a chat completion in documents retrieved from the search index.

pub mod answer;
pub mod links;
pub mod pipeline;
pub mod retriever;

pub use answer::{AnswerGenerator, THROTTLED_MESSAGE, UNEXPECTED_ERROR_PREFIX};
pub use links::LinkRewriter;
pub use pipeline::Orchestrator;
pub use retriever::{
    SearchRetriever, NO_INFORMATION_SENTINEL, RERANKER_CONFIDENCE_THRESHOLD, VECTOR_INDEX_PREFIX,
};
