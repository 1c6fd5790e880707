//! tictactoe_net - server binary
//!
//! Runs the game server or inspects persisted stats.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tictactoe_net::{GameServer, JsonFileBackend, ServerConfig, StatsStore};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            stats_path,
            log_path,
        } => {
            let mut config = ServerConfig::load(Some(config.as_path()))?;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(stats_path) = stats_path {
                config = config.with_stats_path(stats_path);
            }
            if let Some(log_path) = log_path {
                config = config.with_log_path(Some(log_path));
            }
            run_server(config).await
        }
        Command::Stats {
            config,
            stats_path,
            name,
        } => {
            let config = ServerConfig::load(Some(config.as_path()))?;
            let stats_path = stats_path.unwrap_or_else(|| config.stats_path().clone());
            print_stats(stats_path, name)
        }
    }
}

/// Run the game server until the process is killed
async fn run_server(config: ServerConfig) -> Result<()> {
    initialize_tracing(config.log_path().as_deref(), "info")?;

    info!(?config, "Starting tictactoe_net server");

    let stats = Arc::new(StatsStore::open(JsonFileBackend::new(config.stats_path())));
    let listener = GameServer::bind(&config).await?;
    GameServer::new(stats).serve(listener).await;

    Ok(())
}

/// Print counters for one player or everyone
fn print_stats(stats_path: PathBuf, name: Option<String>) -> Result<()> {
    initialize_tracing(None, "warn")?;

    let store = StatsStore::open(JsonFileBackend::new(stats_path));
    match name {
        Some(name) => {
            let record = store.get(&name);
            println!(
                "{name}: {} wins, {} losses, {} draws",
                record.wins(),
                record.losses(),
                record.draws()
            );
        }
        None => {
            let snapshot = store.snapshot();
            if snapshot.is_empty() {
                println!("No stats yet.");
            }
            for (name, record) in snapshot {
                println!(
                    "{name}: {} wins, {} losses, {} draws",
                    record.wins(),
                    record.losses(),
                    record.draws()
                );
            }
        }
    }
    Ok(())
}

/// Installs stdout logging plus an optional append-only log file.
fn initialize_tracing(log_path: Option<&Path>, default_filter: &str) -> Result<()> {
    let file_layer = match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}
