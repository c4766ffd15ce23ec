//! askdocs CLI
//!
//! Main entry point for the askdocs command-line tool.
//! Answers questions from the internal documentation index, either one-off
//! from the terminal or through the agent HTTP endpoint.

mod commands;
mod server;

use askdocs_core::logging::{self, LogFormat};
use askdocs_core::{config::AppConfig, AppResult};
use clap::{Parser, Subcommand};
use commands::{AskCommand, SearchCommand, ServeCommand};
use std::path::PathBuf;

/// askdocs - grounded answers from your documentation
#[derive(Parser, Debug)]
#[command(name = "askdocs")]
#[command(about = "Grounded answers from your documentation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "ASKDOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Number of search results used as context
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question
    Ask(AskCommand),

    /// Show the search context for a question
    Search(SearchCommand),

    /// Run the agent HTTP endpoint
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from file and environment, then apply CLI overrides
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.top_k,
    );

    // Initialize logging with final configuration
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.logging.level.as_deref(), config.no_color(), format)?;

    tracing::info!("askdocs starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Index: {}", config.search.index_name);
    tracing::debug!("Deployment: {}", config.openai.deployment_id);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_flags() {
        let cli = Cli::try_parse_from([
            "askdocs",
            "ask",
            "What is X?",
            "--json",
            "--user-name",
            "ayse",
            "--user-id",
            "42",
            "-k",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.top_k, Some(3));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.question, "What is X?");
                assert!(cmd.json);
                assert_eq!(cmd.user_name.as_deref(), Some("ayse"));
                assert_eq!(cmd.user_id.as_deref(), Some("42"));
            }
            other => panic!("Expected ask command, got {:?}", other),
        }
    }

    #[test]
    fn test_user_id_requires_user_name() {
        assert!(Cli::try_parse_from(["askdocs", "ask", "q", "--user-id", "42"]).is_err());
    }

    #[test]
    fn test_parse_serve_address() {
        let cli = Cli::try_parse_from(["askdocs", "serve", "--address", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(cmd) => assert_eq!(cmd.address.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("Expected serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_question_is_required() {
        assert!(Cli::try_parse_from(["askdocs", "search"]).is_err());
    }
}
