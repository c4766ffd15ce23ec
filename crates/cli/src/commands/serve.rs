//! Serve command handler.

use super::build_pipeline;
use crate::server::{self, AppState};
use askdocs_core::{config::AppConfig, AppResult};
use clap::Args;
use std::sync::Arc;

/// Run the agent HTTP endpoint
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen address (overrides server.address)
    #[arg(short, long)]
    pub address: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let address = self.address.as_deref().unwrap_or(&config.server.address);
        tracing::info!("Starting agent endpoint on {}", address);

        let state = Arc::new(AppState::new(build_pipeline(config)?));
        server::serve(address, state).await
    }
}
