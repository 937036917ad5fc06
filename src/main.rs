//! Crossover signal service CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use signal_config::{load_config, LogFormat};
use signal_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; CLI flags win.
    let logging = load_config(&cli.config).ok().map(|c| c.logging);
    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .or_else(|| logging.as_ref().map(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let json = cli.json_logs || logging.as_ref().is_some_and(|l| l.format == LogFormat::Json);
    let log_file = logging.and_then(|l| l.file);

    let _guard = setup_logging(&log_level, json, log_file.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Serve(args) => cli::commands::serve::run(args, &cli.config).await,
        Commands::Evaluate(args) => cli::commands::evaluate::run(args, &cli.config).await,
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config).await,
    }
}
