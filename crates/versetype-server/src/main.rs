//! Versetype server - WebSocket typing practice.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use versetype_server::{config, logging, routes, state};

use config::{Config, StorageBackend};
use logging::{LogConfig, LogFormat};
use state::AppState;

/// Versetype server - type your way through a text, one passage at a time.
#[derive(Parser, Debug)]
#[command(name = "versetype-server")]
#[command(about = "WebSocket server for passage typing practice")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config and the PORT environment variable
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the corpus file from config
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Override the progress store backend (sqlite, file, memory)
    #[arg(long, value_name = "BACKEND")]
    storage: Option<StorageBackend>,

    /// Enable verbose logging (INFO level for most targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (TRACE level for everything)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "store=debug").
    /// Can be specified multiple times. Targets are prefixed with "versetype::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // CLI beats environment beats file
    config.apply_port_env(std::env::var("PORT").ok().as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(corpus) = cli.corpus {
        config.corpus_path = corpus;
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    tracing::info!(target: "versetype::startup", "Loaded configuration (port: {})", config.port);

    let state = Arc::new(AppState::new(config.clone())?);
    tracing::info!(
        target: "versetype::startup",
        "Initialized application state with {} collections",
        state.index.len()
    );

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "versetype::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
