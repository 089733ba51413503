//! TradeMentor CLI - a command-line client for the TradeMentor platform.
//!
//! Restores the stored session on startup, then runs one command: signing
//! in or out, or calling one of the market, portfolio, news, IPO, learn,
//! trading and stop-loss routes and printing the JSON result.

mod cli;
mod commands;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradementor_core::{
    ApiClient, Config, CredentialStore, KeyringStore, MemoryStore, SecureStore, SessionManager,
};

use cli::Cli;

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("TradeMentor client starting");

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    // Resolved once; changing it needs a restart
    let base_url = config.base_url().context("Failed to resolve API base URL")?;

    let credentials = Arc::new(CredentialStore::new());
    let api = ApiClient::new(base_url, credentials)?;
    let store: Arc<dyn SecureStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(KeyringStore::new())
    };
    let session = SessionManager::new(api, store);

    let result = commands::run(cli.command, &session, &mut config).await;

    info!("TradeMentor client shutting down");
    result
}
