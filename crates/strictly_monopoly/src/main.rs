//! Strictly Monopoly - simulation CLI
//!
//! Drives the rules engine with bots so it can be exercised end to end.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_monopoly::{Game, GameConfig, SimpleBot, simulate};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            players,
            turns,
            seed,
            config,
            events,
        } => run_simulation(players, turns, seed, config, events),
        Command::Board { config } => print_board(config),
    }
}

/// Loads the config file if one was given, defaults otherwise.
fn load_config(path: Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_file(&path)
            .with_context(|| format!("Loading config from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

/// Play a bot-driven session
#[instrument(skip(config))]
fn run_simulation(
    players: usize,
    turns: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
    events: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut game = Game::new(config)?;
    let ids = (0..players)
        .map(|seat| game.register_player(&format!("Bot {}", seat + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    let starter = ids.first().context("At least one player is required")?;
    game.start_game(starter)?;

    info!(players, turns, "Starting simulation");
    let played = simulate(&mut game, &SimpleBot::default(), turns)?;
    info!(played, "Simulation finished");

    if events {
        for event in game.history() {
            println!("{}", serde_json::to_string(event)?);
        }
    }

    let snapshot = game.snapshot();
    println!("Turns played: {}", played);
    for player in &snapshot.players {
        println!(
            "  {:<8} {:>12} money {:>6}  net worth {:>6}  tiles {:>2}",
            player.display_name,
            player.status.to_string(),
            player.money,
            player.net_worth,
            player.assets.len()
        );
    }
    match snapshot.winner_seat.and_then(|seat| snapshot.player(seat)) {
        Some(winner) => println!("Winner: {}", winner.display_name),
        None => println!("No winner yet"),
    }
    Ok(())
}

/// Print the initial board as JSON
#[instrument]
fn print_board(config: Option<PathBuf>) -> Result<()> {
    let game = Game::new(load_config(config)?)?;
    println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
    Ok(())
}
