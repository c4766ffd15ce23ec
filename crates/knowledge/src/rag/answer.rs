//! Chat completion with user-facing failure text.

use askdocs_core::config::AppConfig;
use askdocs_core::AppError;
use askdocs_llm::{ChatClient, ChatMessage, ChatRequest, CompletionConfig, Role};
use std::sync::Arc;
use tracing::instrument;

/// Returned when the completion backend throttles (HTTP 429).
pub const THROTTLED_MESSAGE: &str =
    "Şu anda sistemde bir yoğunluk var. Lütfen bir dakika sonra tekrar deneyin.";

/// Prefix of the text returned for every other completion failure.
pub const UNEXPECTED_ERROR_PREFIX: &str = "Beklenmeyen bir hata alındı: ";

const TOO_MANY_REQUESTS: u16 = 429;

/// Sends the prompt to the completion deployment and always yields text.
pub struct AnswerGenerator {
    client: Arc<dyn ChatClient>,
    deployment: String,
    config: CompletionConfig,
}

impl AnswerGenerator {
    pub fn new(
        client: Arc<dyn ChatClient>,
        deployment: impl Into<String>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            client,
            deployment: deployment.into(),
            config,
        }
    }

    pub fn from_config(client: Arc<dyn ChatClient>, config: &AppConfig) -> Self {
        Self::new(
            client,
            config.openai.deployment_id.clone(),
            CompletionConfig::from(&config.completion),
        )
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Complete `messages` with one backend request and no retry.
    ///
    /// Failures come back as ready-to-show text rather than errors.
    #[instrument(skip(self, messages), fields(deployment = %self.deployment, provider = %self.client.provider_name()))]
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> String {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let request = ChatRequest::new(self.deployment.clone(), messages, self.config.clone());

        let answer = match self.client.complete(&request).await {
            Ok(response) => match response.first_content() {
                Some(content) => content.to_string(),
                None => {
                    tracing::warn!("Completion returned no choices");
                    format!("{}No completion choices returned", UNEXPECTED_ERROR_PREFIX)
                }
            },
            Err(e) => {
                tracing::error!("Chat completion failed: {}", e);
                failure_message(&e)
            }
        };

        tracing::info!("Prompt:{} - Response:{}", prompt, answer);

        answer
    }
}

/// User-facing text for a failed completion.
pub fn failure_message(error: &AppError) -> String {
    match error {
        AppError::Http { status, .. } if *status == TOO_MANY_REQUESTS => {
            THROTTLED_MESSAGE.to_string()
        }
        AppError::Http { reason, .. } => format!("{}{}", UNEXPECTED_ERROR_PREFIX, reason),
        AppError::Llm(message) => format!("{}{}", UNEXPECTED_ERROR_PREFIX, message),
        other => format!("{}{}", UNEXPECTED_ERROR_PREFIX, other),
    }
}
