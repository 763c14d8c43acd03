//! txstats - Main Entry Point

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use txstats_bot::{load_config, run_until_shutdown, App, DiscordNotifier};
use txstats_common::init_logging;
use txstats_config::{Config, ConfigValidator};
use txstats_core::{build_report, take_snapshot, Notifier, ReportSettings, SnapshotStore, TransifexClient};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overriding the configured one
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download today's statistics into the given directory
    #[command(alias = "download-stats")]
    Download {
        /// Snapshot directory
        path: PathBuf,
    },
    /// Print the report for the stored snapshots
    Report {
        /// Also post the report to Discord
        #[arg(long)]
        send: bool,
    },
    /// Run the scheduler until interrupted (default)
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    let mut logging = config.logging.clone();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    init_logging(&logging)?;

    match args.command.unwrap_or(Command::Run) {
        Command::Download { path } => download(&config, path).await,
        Command::Report { send } => report(&config, send).await,
        Command::Run => run(&config).await,
    }
}

async fn download(config: &Config, path: PathBuf) -> Result<()> {
    ConfigValidator::validate_remote(config)?;

    let client = TransifexClient::new(&config.transifex)?;
    let store = SnapshotStore::new(path);
    let written = take_snapshot(&client, &store, Utc::now().date_naive()).await?;

    println!("{}", written.display());
    Ok(())
}

async fn report(config: &Config, send: bool) -> Result<()> {
    let store = SnapshotStore::new(&config.storage.output_dir);
    let settings = ReportSettings::from(&config.report);

    let Some(message) = build_report(&store, &settings)? else {
        println!("No changes to report");
        return Ok(());
    };

    println!("{message}");

    if send {
        ConfigValidator::validate_discord(config)?;
        DiscordNotifier::new(&config.discord).send(&message).await?;
    }
    Ok(())
}

async fn run(config: &Config) -> Result<()> {
    info!("Starting txstats scheduler");

    let app = Arc::new(App::from_config(config)?);
    run_until_shutdown(app, &config.scheduling).await?;

    info!("txstats has shut down");
    Ok(())
}
