//! Question embedding.

use askdocs_core::AppResult;
use askdocs_llm::EmbeddingClient;
use std::sync::Arc;
use tracing::instrument;

/// Turns question text into a vector with the configured embedding model.
///
/// Vectors are produced fresh on every call and never cached.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    client: Arc<dyn EmbeddingClient>,
}

impl EmbeddingGenerator {
    pub fn new(client: Arc<dyn EmbeddingClient>) -> Self {
        Self { client }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Embed `text`. Backend errors are returned unchanged.
    #[instrument(skip(self, text), fields(model = %self.client.model_name()))]
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let vector = self.client.embed(text).await?;
        tracing::debug!(dimensions = vector.len(), "Embedded question");
        Ok(vector)
    }
}

impl std::fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("provider", &self.client.provider_name())
            .field("model", &self.client.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_llm::MockEmbeddingClient;

    #[tokio::test]
    async fn test_embed_returns_backend_vector() {
        let generator = EmbeddingGenerator::new(Arc::new(MockEmbeddingClient::new(16)));
        let vector = generator.embed("izin talebi nasıl yapılır").await.unwrap();

        assert_eq!(vector.len(), 16);
        assert_eq!(generator.model_name(), "mock-trigram");
    }

    #[tokio::test]
    async fn test_embed_propagates_backend_error() {
        let generator = EmbeddingGenerator::new(Arc::new(MockEmbeddingClient::failing()));
        let err = generator.embed("q").await.unwrap_err();
        assert!(err.to_string().contains("Mock embedding failure"));
    }
}
