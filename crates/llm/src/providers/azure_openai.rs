//! Azure OpenAI provider implementation.
//!
//! Chat completions and embeddings against an Azure OpenAI resource:
//! `POST {endpoint}/openai/deployments/{deployment}/chat/completions`
//! `POST {endpoint}/openai/deployments/{model}/embeddings`

use crate::client::{ChatChoice, ChatClient, ChatRequest, ChatResponse, EmbeddingClient};
use crate::types::ChatMessage;
use askdocs_core::config::OpenAiConfig;
use askdocs_core::{AppError, AppResult};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct AzureChatRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    top_p: f32,
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<AzureChoice>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    #[serde(default)]
    index: u32,
    message: AzureChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct AzureChoiceMessage {
    /// Null when the content filter suppressed the answer
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AzureEmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct AzureEmbeddingResponse {
    data: Vec<AzureEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct AzureEmbeddingData {
    embedding: Vec<f32>,
}

/// Azure OpenAI client for chat completions and embeddings.
///
/// Holds one pooled `reqwest::Client`; safe to share across requests.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    embedding_model: String,
}

impl AzureOpenAiClient {
    /// Create a client from the `openai` configuration section.
    pub fn new(config: &OpenAiConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Config("Azure OpenAI requires an API key".to_string()))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version: config.api_version.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn chat_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.embedding_model, self.api_version
        )
    }

    fn to_azure_request<'a>(request: &'a ChatRequest) -> AzureChatRequest<'a> {
        AzureChatRequest {
            messages: &request.messages,
            max_tokens: request.config.max_tokens(),
            temperature: request.config.temperature(),
            frequency_penalty: request.config.frequency_penalty(),
            presence_penalty: request.config.presence_penalty(),
            top_p: request.config.top_p(),
            stop: request.config.stop(),
        }
    }

    fn convert_response(response: AzureChatResponse) -> ChatResponse {
        let choices = response
            .choices
            .into_iter()
            .map(|c| ChatChoice {
                index: c.index,
                content: c.message.content.unwrap_or_default(),
            })
            .collect();

        ChatResponse {
            model: response.model,
            choices,
        }
    }
}

/// Turn a non-success response into `AppError::Http`.
async fn status_error(response: Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!("Azure OpenAI returned {}: {}", status, body);

    AppError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

#[async_trait::async_trait]
impl ChatClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure-openai"
    }

    #[instrument(skip(self, request), fields(deployment = %request.deployment, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let url = self.chat_url(&request.deployment);
        debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&Self::to_azure_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Azure OpenAI: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: AzureChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat completion: {}", e)))?;

        debug!("Received {} choice(s) from Azure OpenAI", body.choices.len());

        Ok(Self::convert_response(body))
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure-openai"
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.embedding_model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let response = self
            .client
            .post(self.embeddings_url())
            .header("api-key", &self.api_key)
            .json(&AzureEmbeddingRequest { input: text })
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send embedding request: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: AzureEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse embedding response: {}", e)))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Llm("No embedding returned".to_string()))
    }
}
