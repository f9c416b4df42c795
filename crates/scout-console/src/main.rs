//! Scout - terminal client for a remote research agent.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use scout_console::console::run_console;
use scout_console::oneshot::{self, AskOptions};
use scout_console::ScoutConfig;

#[derive(Parser)]
#[command(name = "scout")]
#[command(version, about = "Ask a research agent from the terminal", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Research endpoint URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Console,

    /// Ask a single question and print the answer
    Ask {
        /// Question or topic
        query: String,

        /// Print the normalized response as JSON
        #[arg(long)]
        json: bool,

        /// Append the result to the archive file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ScoutConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(cli.endpoint, cli.timeout_secs);
    config.validate()?;

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Console => {
            setup_console_logging(&config, cli.debug)?;
            run_console(&config).await
        }
        Commands::Ask { query, json, save } => {
            setup_logging(&config, cli.debug);
            ask(&config, &query, json, save).await
        }
    }
}

/// One submission, printed to stdout.
async fn ask(config: &ScoutConfig, query: &str, json: bool, save: bool) -> anyhow::Result<()> {
    let client = config.build_client()?;
    let options = AskOptions {
        json,
        save_to: save.then(|| config.archive_path.clone()),
    };

    let mut stdout = std::io::stdout().lock();
    oneshot::ask(&client, query, &options, &mut stdout).await?;

    if save {
        eprintln!("Saved to {}", config.archive_path.display());
    }
    Ok(())
}

fn log_filter(config: &ScoutConfig, debug: bool, fallback: &str) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if debug {
        return EnvFilter::new("scout=debug,scout_console=debug,scout_client=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or(fallback))
    })
}

/// Logging for one-shot commands: stderr, so stdout stays clean for output.
fn setup_logging(config: &ScoutConfig, debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(config, debug, "warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Logging for the console: a file under the data dir, so the TUI stays intact.
fn setup_console_logging(config: &ScoutConfig, debug: bool) -> anyhow::Result<()> {
    use std::fs::OpenOptions;
    use std::sync::Arc;

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scout")
        .join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("scout.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(config, debug, "scout_console=info,scout_client=info"))
        .with_writer(Arc::new(file))
        .with_target(false)
        .with_ansi(false)
        .init();

    Ok(())
}
