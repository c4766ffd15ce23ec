//! Mock providers for offline runs and tests.

use crate::client::{ChatChoice, ChatClient, ChatRequest, ChatResponse, EmbeddingClient};
use crate::types::Role;
use askdocs_core::{AppError, AppResult};
use std::sync::Mutex;

/// What the mock chat client answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Echo the last user message back
    Echo,
    /// Always return this content
    Content(String),
    /// Always fail with this HTTP status and reason
    Status(u16, String),
    /// Always fail without a status, like a dropped connection
    Transport(String),
}

/// Scripted chat client that records every request it receives.
#[derive(Debug)]
pub struct MockChatClient {
    reply: MockReply,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new(MockReply::Echo)
    }
}

#[async_trait::async_trait]
impl ChatClient for MockChatClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let content = match &self.reply {
            MockReply::Echo => {
                let question = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                format!("Mock answer for: {}", question)
            }
            MockReply::Content(content) => content.clone(),
            MockReply::Status(status, reason) => {
                return Err(AppError::Http {
                    status: *status,
                    reason: reason.clone(),
                })
            }
            MockReply::Transport(message) => return Err(AppError::Llm(message.clone())),
        };

        Ok(ChatResponse {
            model: request.deployment.clone(),
            choices: vec![ChatChoice {
                index: 0,
                content,
            }],
        })
    }
}

/// Deterministic embedding client.
///
/// Hashes character trigrams into a fixed number of dimensions and
/// normalizes to unit length, so equal texts give equal vectors.
#[derive(Debug)]
pub struct MockEmbeddingClient {
    dimensions: usize,
    fail: bool,
}

impl MockEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail: false,
        }
    }

    /// A client whose every call fails.
    pub fn failing() -> Self {
        Self {
            dimensions: 0,
            fail: true,
        }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions.max(1)];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        for window in chars.windows(3) {
            let hash = window
                .iter()
                .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
            let idx = (hash as usize) % embedding.len();
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for MockEmbeddingClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-trigram"
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if self.fail {
            return Err(AppError::Llm("Mock embedding failure".to_string()));
        }
        Ok(self.generate(text))
    }
}
