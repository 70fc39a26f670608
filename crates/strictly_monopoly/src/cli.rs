//! Command-line interface for strictly_monopoly.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Monopoly - authoritative Monopoly rules engine
#[derive(Parser, Debug)]
#[command(name = "strictly_monopoly")]
#[command(about = "Run simulated Monopoly sessions against the rules engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a bot-driven session and print the standings
    Simulate {
        /// Number of bot players
        #[arg(short, long, default_value = "4")]
        players: usize,

        /// Maximum number of turns to play
        #[arg(short, long, default_value = "500")]
        turns: usize,

        /// Seed for dice and shuffles (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Path to a TOML game config (falls back to MONOPOLY_CONFIG)
        #[arg(short, long, env = "MONOPOLY_CONFIG")]
        config: Option<PathBuf>,

        /// Print every update event as a JSON line
        #[arg(long)]
        events: bool,
    },

    /// Print the initial board as JSON
    Board {
        /// Path to a TOML game config (falls back to MONOPOLY_CONFIG)
        #[arg(short, long, env = "MONOPOLY_CONFIG")]
        config: Option<PathBuf>,
    },
}
