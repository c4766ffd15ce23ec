//! Ask command handler.
//!
//! Runs the full answer pipeline for one question.

use super::build_pipeline;
use crate::server::ChatCompletion;
use askdocs_core::{config::AppConfig, AppError, AppResult};
use askdocs_knowledge::UserIdentity;
use clap::Args;

/// Ask a question against the documentation index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as a chat.completion JSON object
    #[arg(long)]
    pub json: bool,

    /// Display name recorded in the logs
    #[arg(long)]
    pub user_name: Option<String>,

    /// User id recorded in the logs next to the name
    #[arg(long, requires = "user_name")]
    pub user_id: Option<String>,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let pipeline = build_pipeline(config)?;
        let answer = pipeline.answer(question, &self.identity()).await?;

        if self.json {
            let completion = ChatCompletion::new(pipeline.deployment(), answer);
            let json = serde_json::to_string_pretty(&completion)?;
            println!("{}", json);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }

    fn identity(&self) -> UserIdentity {
        UserIdentity {
            name: self.user_name.clone(),
            id: self.user_id.clone(),
        }
    }
}
