//! Agent HTTP endpoint.
//!
//! - `POST /api/github/agent`: answer the last message of a chat-style request
//! - `GET /api/github/callback`: landing page after the OAuth round-trip

pub mod types;

pub use types::{AgentRequest, ApiError, ChatCompletion};

use askdocs_core::AppResult;
use askdocs_knowledge::{Orchestrator, UserIdentity};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Base path of the GitHub extension routes.
pub const API_PREFIX: &str = "/api/github";

/// Shown after the GitHub authorization callback.
pub const CALLBACK_MESSAGE: &str = "You may close this tab and return to GitHub.com (where you \
should refresh the page and start a fresh chat). If you're using VS Code or Visual Studio, \
return there.";

/// Shared by every request.
pub struct AppState {
    pub pipeline: Orchestrator,
}

impl AppState {
    pub fn new(pipeline: Orchestrator) -> Self {
        Self { pipeline }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&format!("{}/agent", API_PREFIX), post(agent))
        .route(&format!("{}/callback", API_PREFIX), get(callback))
        .with_state(state)
}

/// Bind `address` and serve until Ctrl+C.
pub async fn serve(address: &str, state: Arc<AppState>) -> AppResult<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Agent endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Agent endpoint stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<ChatCompletion>, ApiError> {
    let Json(request) = payload?;
    for message in &request.messages {
        tracing::info!(
            "Role: {}, Content: {}",
            message.role.as_deref().unwrap_or_default(),
            message.content.as_deref().unwrap_or_default()
        );
    }

    let question = request.question().ok_or_else(|| {
        ApiError::BadRequest("The last message must have non-empty content".to_string())
    })?;

    let answer = state
        .pipeline
        .answer(question, &UserIdentity::anonymous())
        .await
        .map_err(|e| {
            tracing::error!("Agent request failed: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    tracing::info!("Agent answer: {}", answer);
    Ok(Json(ChatCompletion::new(state.pipeline.deployment(), answer)))
}

async fn callback() -> &'static str {
    CALLBACK_MESSAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::config::AppConfig;
    use askdocs_knowledge::search::MockSearchBackend;
    use askdocs_llm::{MockChatClient, MockEmbeddingClient, MockReply};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_with(reply: MockReply, template: &str) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.openai.provider = "mock".to_string();
        config.openai.deployment_id = "gpt-35".to_string();
        config.search.provider = "mock".to_string();
        config.prompt.template = template.to_string();
        config.links.docs_host = "docs.example.com".to_string();

        let search = MockSearchBackend::with_documents(vec![json!({
            "sourceUrl": "/docs/x",
            "content": "X is Y",
            "hierarchy": "X",
            "@search.rerankerScore": 2.5
        })]);

        let pipeline = Orchestrator::from_config(
            &config,
            Arc::new(MockChatClient::new(reply)),
            Arc::new(MockEmbeddingClient::new(8)),
            Arc::new(search),
        )
        .unwrap();

        Arc::new(AppState::new(pipeline))
    }

    fn state() -> Arc<AppState> {
        state_with(
            MockReply::Content("See [X](/docs/x).".to_string()),
            "Today is {{today}}.",
        )
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/github/agent")
            .header("content-type", "application/json")
            .header("x-github-token", "ignored")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_agent_answers_last_message() {
        let response = router(state())
            .oneshot(post_json(json!({
                "copilot_thread_id": "t-1",
                "messages": [
                    { "role": "user", "content": "hello" },
                    { "role": "user", "content": "What is X?" }
                ]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["object"], "chat.completion");
        assert_eq!(body["model"], "gpt-35");
        assert_eq!(
            body["choices"][0]["message"]["content"],
            "See [X](https://docs.example.com/docs/x)."
        );
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn test_agent_rejects_empty_messages() {
        let response = router(state())
            .oneshot(post_json(json!({ "messages": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_agent_rejects_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/github/agent")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_throttling_is_a_normal_answer() {
        let state = state_with(
            MockReply::Status(429, "Too Many Requests".to_string()),
            "Today is {{today}}.",
        );
        let response = router(state)
            .oneshot(post_json(json!({
                "messages": [{ "role": "user", "content": "What is X?" }]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await["choices"][0]["message"]["content"],
            askdocs_knowledge::THROTTLED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_agent_prompt_failure_is_server_error() {
        let state = state_with(MockReply::Echo, "{{> missing_partial}}");
        let response = router(state)
            .oneshot(post_json(json!({
                "messages": [{ "role": "user", "content": "What is X?" }]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["error"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_callback_message() {
        let request = Request::builder()
            .uri("/api/github/callback")
            .body(Body::empty())
            .unwrap();

        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), CALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_unprefixed_routes_are_not_served() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "messages": [{ "content": "q" }] }).to_string()))
            .unwrap();
        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = Request::builder()
            .uri("/api/agent/callback")
            .body(Body::empty())
            .unwrap();
        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
