//! FinStep CLI
//!
//! Command-line entry point for the FinStep financial mentor. Every answer
//! passes through two model stages: a drafting stage grounded in the local
//! reference corpus, then a UK compliance review.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, PopulateCommand, StatsCommand};
use finstep_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// FinStep - compliance-reviewed financial answers for UK students
#[derive(Parser, Debug)]
#[command(name = "finstep")]
#[command(about = "Compliance-reviewed financial answers for UK students", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FINSTEP_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FINSTEP_CONFIG")]
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

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "FINSTEP_PROVIDER")]
    provider: Option<String>,

    /// Model for the drafting stage
    #[arg(long, global = true, env = "FINSTEP_DRAFT_MODEL")]
    draft_model: Option<String>,

    /// Model for the compliance-review stage
    #[arg(long, global = true, env = "FINSTEP_REVIEW_MODEL")]
    review_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive question-and-answer session
    Chat(ChatCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Load the reference corpus into the knowledge store
    Populate(PopulateCommand),

    /// Show knowledge store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up GEMINI_API_KEY and friends from a local .env
    dotenvy::dotenv().ok();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.draft_model,
        cli.review_model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("FinStep CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!(
        "Models: draft={}, review={}",
        config.draft_model,
        config.review_model
    );

    // Ensure .finstep directory exists
    config.ensure_finstep_dir()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Populate(_) => "populate",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Populate(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.map_err(Into::into)
}
