//! End-to-end answer pipeline.

use crate::embedding::EmbeddingGenerator;
use crate::rag::answer::AnswerGenerator;
use crate::rag::links::LinkRewriter;
use crate::rag::retriever::SearchRetriever;
use crate::search::SearchBackend;
use crate::types::UserIdentity;
use askdocs_core::config::AppConfig;
use askdocs_core::AppResult;
use askdocs_llm::{ChatClient, EmbeddingClient};
use askdocs_prompt::PromptBuilder;
use std::sync::Arc;
use tracing::instrument;

/// Question in, grounded markdown answer out.
///
/// Stages run strictly in order: retrieve, build prompt, complete,
/// rewrite links. The pipeline holds no per-request state, so one
/// instance can serve concurrent requests.
pub struct Orchestrator {
    retriever: SearchRetriever,
    prompts: PromptBuilder,
    generator: AnswerGenerator,
    links: LinkRewriter,
}

impl Orchestrator {
    pub fn new(
        retriever: SearchRetriever,
        prompts: PromptBuilder,
        generator: AnswerGenerator,
        links: LinkRewriter,
    ) -> Self {
        Self {
            retriever,
            prompts,
            generator,
            links,
        }
    }

    /// Wire the pipeline from validated configuration and shared clients.
    pub fn from_config(
        config: &AppConfig,
        chat: Arc<dyn ChatClient>,
        embeddings: Arc<dyn EmbeddingClient>,
        search: Arc<dyn SearchBackend>,
    ) -> AppResult<Self> {
        let retriever = SearchRetriever::from_config(
            search,
            EmbeddingGenerator::new(embeddings),
            &config.search,
        );
        let prompts = PromptBuilder::from_config(&config.prompt)?;
        let generator = AnswerGenerator::from_config(chat, config);
        let links = LinkRewriter::new(config.links.docs_host.trim())?;

        Ok(Self::new(retriever, prompts, generator, links))
    }

    pub fn retriever(&self) -> &SearchRetriever {
        &self.retriever
    }

    pub fn deployment(&self) -> &str {
        self.generator.deployment()
    }

    /// Answer `question` on behalf of `user`.
    ///
    /// Backend failures are already folded into the returned text; the
    /// only error is a system prompt that cannot be rendered.
    #[instrument(skip(self, question, user), fields(user = %user))]
    pub async fn answer(&self, question: &str, user: &UserIdentity) -> AppResult<String> {
        tracing::info!("Answering question: {}", question);

        let context = self.retriever.retrieve(question).await;
        let messages = self.prompts.build(question, &context)?;
        let raw = self.generator.complete(messages).await;

        Ok(self.links.rewrite(&raw))
    }
}
