//! Command-line interface for tictactoe_net.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Networked two-player tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "tictactoe_net")]
#[command(about = "Two-player tic-tac-toe over a line-based TCP protocol", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept players and run games one at a time
    Serve {
        /// Path to a TOML config file
        #[arg(short, long, default_value = "tictactoe.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Stats snapshot file (overrides config)
        #[arg(long)]
        stats_path: Option<PathBuf>,

        /// Lifecycle log file (overrides config)
        #[arg(long)]
        log_path: Option<PathBuf>,
    },

    /// Print persisted win/loss/draw counters
    Stats {
        /// Path to a TOML config file
        #[arg(short, long, default_value = "tictactoe.toml")]
        config: PathBuf,

        /// Stats snapshot file (overrides config)
        #[arg(long)]
        stats_path: Option<PathBuf>,

        /// Only show this player
        name: Option<String>,
    },
}
