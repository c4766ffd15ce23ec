//! Search command handler.
//!
//! Prints the grounding context the model would receive, without calling
//! the completion backend.

use super::build_pipeline;
use askdocs_core::{config::AppConfig, AppError, AppResult};
use clap::Args;

/// Show the retrieved context for a question
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The question to search for
    pub question: String,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let pipeline = build_pipeline(config)?;
        let retriever = pipeline.retriever();
        tracing::debug!(vector = retriever.uses_vector_search(), "Running retrieval");

        let context = retriever.retrieve(question).await;
        if context.is_empty() {
            eprintln!("Search failed; the model would receive an empty context.");
        } else {
            print!("{}", context);
        }

        Ok(())
    }
}
