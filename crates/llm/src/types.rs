//! Chat message and sampling types.
//!
//! These are the provider-neutral shapes the pipeline builds; providers
//! translate them into their own wire formats.

use serde::{Deserialize, Serialize};

/// Frequency penalty applied to every completion.
pub const FREQUENCY_PENALTY: f32 = 0.5;

/// Presence penalty applied to every completion.
pub const PRESENCE_PENALTY: f32 = 0.0;

/// Nucleus sampling factor (`top_p`) applied to every completion.
pub const NUCLEUS_SAMPLING_FACTOR: f32 = 0.95;

/// Stop sequences applied to every completion.
pub const STOP_SEQUENCES: [&str; 1] = ["You:"];

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a completion.
///
/// Only `max_tokens` and `temperature` come from configuration; the
/// penalties, `top_p` and the stop sequences are fixed for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    max_tokens: u32,
    temperature: f32,
}

impl CompletionConfig {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn frequency_penalty(&self) -> f32 {
        FREQUENCY_PENALTY
    }

    pub fn presence_penalty(&self) -> f32 {
        PRESENCE_PENALTY
    }

    pub fn top_p(&self) -> f32 {
        NUCLEUS_SAMPLING_FACTOR
    }

    pub fn stop(&self) -> Vec<String> {
        STOP_SEQUENCES.iter().map(|s| s.to_string()).collect()
    }
}

impl From<&askdocs_core::config::CompletionSettings> for CompletionConfig {
    fn from(settings: &askdocs_core::config::CompletionSettings) -> Self {
        Self::new(settings.max_tokens, settings.temperature)
    }
}

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    AzureOpenAi,
    Mock,
}

impl ProviderType {
    /// Parse a provider name as accepted by configuration validation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "azure-openai" => Some(Self::AzureOpenAi),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureOpenAi => "azure-openai",
            Self::Mock => "mock",
        }
    }
}
