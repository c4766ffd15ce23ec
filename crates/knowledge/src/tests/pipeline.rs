//! End-to-end pipeline behaviour with stubbed backends.

use crate::embedding::EmbeddingGenerator;
use crate::rag::{
    AnswerGenerator, LinkRewriter, Orchestrator, SearchRetriever, NO_INFORMATION_SENTINEL,
    THROTTLED_MESSAGE,
};
use crate::search::{MockSearchBackend, MockSearchReply};
use crate::types::UserIdentity;
use askdocs_core::config::AppConfig;
use askdocs_core::RetrievalFailurePolicy;
use askdocs_llm::{CompletionConfig, MockChatClient, MockEmbeddingClient, MockReply, Role};
use askdocs_prompt::PromptBuilder;
use serde_json::json;
use std::sync::Arc;

const DOCS_HOST: &str = "docs.example.com";

fn document(url: &str, score: f64) -> serde_json::Value {
    json!({
        "sourceUrl": url,
        "content": format!("content of {}", url),
        "hierarchy": format!("Docs > {}", url),
        "@search.rerankerScore": score
    })
}

fn orchestrator(
    search: Arc<MockSearchBackend>,
    chat: Arc<MockChatClient>,
    policy: RetrievalFailurePolicy,
) -> Orchestrator {
    Orchestrator::new(
        SearchRetriever::new(
            search,
            EmbeddingGenerator::new(Arc::new(MockEmbeddingClient::new(8))),
            5,
            policy,
        ),
        PromptBuilder::new("Today is {{today}}.", "en_US").unwrap(),
        AnswerGenerator::new(chat, "gpt-35", CompletionConfig::new(800, 0.7)),
        LinkRewriter::new(DOCS_HOST).unwrap(),
    )
}

/// The user turn the completion backend received.
fn sent_user_turn(chat: &MockChatClient) -> String {
    let requests = chat.requests();
    assert_eq!(requests.len(), 1);

    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].role, Role::User);
    messages[1].content.clone()
}

#[tokio::test]
async fn test_single_document_end_to_end() {
    let search = Arc::new(MockSearchBackend::with_documents(vec![json!({
        "sourceUrl": "/docs/x",
        "content": "X is Y",
        "hierarchy": "X",
        "@search.rerankerScore": 2.5
    })]));
    let chat = Arc::new(MockChatClient::new(MockReply::Content(
        "See [X](/docs/x).".to_string(),
    )));
    let pipeline = orchestrator(search, chat.clone(), RetrievalFailurePolicy::Empty);

    let answer = pipeline
        .answer("What is X?", &UserIdentity::new("Ayşe", "42"))
        .await
        .unwrap();

    assert_eq!(answer, "See [X](https://docs.example.com/docs/x).");
    assert_eq!(
        sent_user_turn(&chat),
        "[Question] What is X? \r\n\r\n[Context] [Result]: <Title>X</Title><Url>/docs/x</Url>\nX is Y\n\n \r\n"
    );
}

#[tokio::test]
async fn test_empty_index_sends_sentinel() {
    let chat = Arc::new(MockChatClient::default());
    let pipeline = orchestrator(
        Arc::new(MockSearchBackend::default()),
        chat.clone(),
        RetrievalFailurePolicy::Empty,
    );

    pipeline
        .answer("What is X?", &UserIdentity::anonymous())
        .await
        .unwrap();

    assert_eq!(
        sent_user_turn(&chat),
        format!(
            "[Question] What is X? \r\n\r\n[Context] {} \r\n",
            NO_INFORMATION_SENTINEL
        )
    );
}

#[tokio::test]
async fn test_low_confidence_sends_sentinel_only() {
    let search = Arc::new(MockSearchBackend::with_documents(vec![
        document("/weak", 0.4),
        document("/strong", 3.1),
    ]));
    let chat = Arc::new(MockChatClient::default());
    let pipeline = orchestrator(search, chat.clone(), RetrievalFailurePolicy::Empty);

    pipeline.answer("q", &UserIdentity::anonymous()).await.unwrap();

    let turn = sent_user_turn(&chat);
    assert!(turn.contains(NO_INFORMATION_SENTINEL));
    assert!(!turn.contains("[Result]:"));
}

#[tokio::test]
async fn test_context_is_ranked_and_bounded() {
    let documents = (0..7u32)
        .map(|i| document(&format!("/page/{}", i), 1.0 + f64::from(i)))
        .collect();
    let search = Arc::new(MockSearchBackend::with_documents(documents));
    let chat = Arc::new(MockChatClient::default());
    let pipeline = orchestrator(search, chat.clone(), RetrievalFailurePolicy::Empty);

    pipeline.answer("q", &UserIdentity::anonymous()).await.unwrap();

    let turn = sent_user_turn(&chat);
    assert_eq!(turn.matches("[Result]:").count(), 5);
    let positions: Vec<usize> = (2..7)
        .rev()
        .map(|i| turn.find(&format!("<Url>/page/{}</Url>", i)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!turn.contains("/page/0<"));
    assert!(!turn.contains("/page/1<"));
}

#[tokio::test]
async fn test_search_failure_sends_empty_context_by_default() {
    let search = Arc::new(MockSearchBackend::new(MockSearchReply::Status(
        503,
        "Service Unavailable".to_string(),
    )));
    let chat = Arc::new(MockChatClient::default());
    let pipeline = orchestrator(search, chat.clone(), RetrievalFailurePolicy::Empty);

    let answer = pipeline.answer("q", &UserIdentity::anonymous()).await.unwrap();

    assert_eq!(sent_user_turn(&chat), "[Question] q \r\n\r\n[Context]  \r\n");
    assert!(!answer.contains(NO_INFORMATION_SENTINEL));
}

#[tokio::test]
async fn test_search_failure_with_sentinel_policy() {
    let search = Arc::new(MockSearchBackend::new(MockSearchReply::Transport(
        "connection refused".to_string(),
    )));
    let chat = Arc::new(MockChatClient::default());
    let pipeline = orchestrator(search, chat.clone(), RetrievalFailurePolicy::Sentinel);

    pipeline.answer("q", &UserIdentity::anonymous()).await.unwrap();

    assert!(sent_user_turn(&chat).contains(NO_INFORMATION_SENTINEL));
}

#[tokio::test]
async fn test_throttled_completion_is_returned_as_text() {
    let search = Arc::new(MockSearchBackend::with_documents(vec![document("/a", 2.0)]));
    let chat = Arc::new(MockChatClient::new(MockReply::Status(
        429,
        "Too Many Requests".to_string(),
    )));
    let pipeline = orchestrator(search, chat, RetrievalFailurePolicy::Empty);

    let answer = pipeline.answer("q", &UserIdentity::anonymous()).await.unwrap();
    assert_eq!(answer, THROTTLED_MESSAGE);
}

#[tokio::test]
async fn test_from_config_with_mock_providers() {
    let mut config = AppConfig::default();
    config.openai.provider = "mock".to_string();
    config.openai.deployment_id = "gpt-35".to_string();
    config.search.provider = "mock".to_string();
    config.links.docs_host = DOCS_HOST.to_string();

    let pipeline = Orchestrator::from_config(
        &config,
        askdocs_llm::create_chat_client(&config.openai).unwrap(),
        askdocs_llm::create_embedding_client(&config.openai).unwrap(),
        crate::search::create_search_backend(&config.search).unwrap(),
    )
    .unwrap();

    assert_eq!(pipeline.deployment(), "gpt-35");
    assert!(!pipeline.retriever().uses_vector_search());

    let answer = pipeline
        .answer("What is X?", &UserIdentity::anonymous())
        .await
        .unwrap();
    assert!(answer.starts_with("Mock answer for: [Question] What is X?"));
}
