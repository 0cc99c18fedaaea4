//! projrelay - debounced project change notifications

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{cmd, config, logging};
use std::path::PathBuf;

/// Coalesce bursts of project changes into one notification per project
#[derive(Parser)]
#[command(name = "projrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/projrelay/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the debounce window in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read JSON change records from stdin and relay notifications to stdout
    Run,
    /// Watch a directory for project file changes
    Watch {
        /// Directory to watch
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// View configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        list: bool,
        /// Show the config file path
        #[arg(long)]
        path: bool,
        /// Create the config file with defaults if missing (with --path)
        #[arg(long, requires = "path")]
        create: bool,
        /// Print an annotated example configuration
        #[arg(long)]
        example: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { path: true, create, .. } = cli.command {
        return cmd::config::run_path(cli.config.as_deref(), create).await;
    }
    if let Commands::Config { example: true, .. } = cli.command {
        return cmd::config::run_example().await;
    }

    let mut system_config = config::load(cli.config.as_deref())?;
    if let Some(debounce_ms) = cli.debounce_ms {
        system_config.notifier.debounce_ms = debounce_ms;
        system_config.validate()?;
    }

    let _log_guard = logging::init(&system_config.log, cli.verbose)?;

    match cli.command {
        Commands::Run => cmd::run::run(&system_config).await,
        Commands::Watch { root } => cmd::watch::run(&system_config, &root).await,
        Commands::Config { list, .. } => {
            if !list {
                tracing::debug!("No config flag given, listing effective configuration");
            }
            cmd::config::run_list(&system_config, cli.config.as_deref()).await
        }
    }
}
