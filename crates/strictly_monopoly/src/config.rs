//! Game configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Tunable parameters of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// Money granted at registration.
    #[serde(default = "default_starting_money")]
    starting_money: i64,

    /// Credit for landing on or passing Go.
    #[serde(default = "default_go_salary")]
    go_salary: i64,

    /// Cost of buying your way out of jail.
    #[serde(default = "default_jail_fee")]
    jail_fee: i64,

    /// Players needed to start.
    #[serde(default = "default_min_players")]
    min_players: usize,

    /// Registration capacity.
    #[serde(default = "default_max_players")]
    max_players: usize,

    /// Length of generated player ids.
    #[serde(default = "default_player_id_length")]
    player_id_length: usize,

    /// Characters player ids are drawn from.
    #[serde(default = "default_player_id_alphabet")]
    player_id_alphabet: String,

    /// Seed for dice and shuffles; entropy when absent.
    #[serde(default)]
    #[setters(strip_option)]
    seed: Option<u64>,
}

#[instrument]
fn default_starting_money() -> i64 {
    1500
}

#[instrument]
fn default_go_salary() -> i64 {
    200
}

#[instrument]
fn default_jail_fee() -> i64 {
    50
}

#[instrument]
fn default_min_players() -> usize {
    2
}

#[instrument]
fn default_max_players() -> usize {
    8
}

#[instrument]
fn default_player_id_length() -> usize {
    16
}

#[instrument]
fn default_player_id_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyz0123456789".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            go_salary: default_go_salary(),
            jail_fee: default_jail_fee(),
            min_players: default_min_players(),
            max_players: default_max_players(),
            player_id_length: default_player_id_length(),
            player_id_alphabet: default_player_id_alphabet(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            starting_money = config.starting_money,
            max_players = config.max_players,
            seeded = config.seed.is_some(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values describe a playable game.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < 2 {
            return Err(ConfigError::new(format!(
                "min_players must be at least 2, got {}",
                self.min_players
            )));
        }
        if self.min_players > self.max_players {
            return Err(ConfigError::new(format!(
                "min_players ({}) exceeds max_players ({})",
                self.min_players, self.max_players
            )));
        }
        if self.player_id_length == 0 {
            return Err(ConfigError::new("player_id_length must be positive".to_string()));
        }
        if self.player_id_alphabet.is_empty() {
            return Err(ConfigError::new("player_id_alphabet must not be empty".to_string()));
        }
        let alphabet = self.player_id_alphabet.chars().count() as u128;
        let length = u32::try_from(self.player_id_length).unwrap_or(u32::MAX);
        let space = alphabet.checked_pow(length).unwrap_or(u128::MAX);
        if space < self.max_players as u128 {
            return Err(ConfigError::new(format!(
                "player id space ({}) is smaller than max_players ({})",
                space, self.max_players
            )));
        }
        if self.starting_money < 0 || self.go_salary < 0 || self.jail_fee < 0 {
            return Err(ConfigError::new("money amounts must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
