//! Strictly Monopoly - an authoritative Monopoly rules engine
//!
//! Clients act through [`Game`] (or a shared [`Session`]) and learn what
//! happened by draining their per-player event queue.
//!
//! # Architecture
//!
//! - **Rules**: board layout, rent tables, and constants
//! - **Player updates**: the closed command set every state change goes through
//! - **Game**: turn order, validation, and event sequencing
//! - **Events**: per-player FIFO queues with status, prompt, and update scopes
//! - **Session**: mutex-guarded handles for hosts serving several games
//!
//! # Example
//!
//! ```
//! use strictly_monopoly::{Game, GameConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut game = Game::new(GameConfig::default().with_seed(7))?;
//! let alice = game.register_player("Alice")?;
//! let _bob = game.register_player("Bob")?;
//! game.start_game(&alice)?;
//!
//! let active = game.active_player_id().unwrap_or_default().to_string();
//! game.roll_dice(&active)?;
//! for event in game.drain_events(&active)? {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bots;
mod cards;
mod config;
mod error;
mod events;
mod game;
mod invariants;
mod player;
mod roll;
mod rules;
mod session;
mod snapshot;
mod tiles;
mod types;
mod updates;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Errors
pub use error::{ActionError, ActionResponse, ErrorKind};

// Crate-level exports - Game
pub use game::{Game, RollOutcome};

// Crate-level exports - Events
pub use events::{Event, EventError, EventName, EventQueue, EventType};

// Crate-level exports - Board and cards
pub use cards::{Card, CardEffect, Deck};
pub use tiles::{AssetTile, Board, Tile, TileKind};

// Crate-level exports - Players and updates
pub use player::{Player, PlayerId};
pub use updates::{ImprovementPlan, PlayerUpdate, plan_improvements};

// Crate-level exports - Dice
pub use roll::{Dice, LoadedDice, RandomDice, Roll};

// Crate-level exports - Domain types and rules
pub use rules::*;
pub use types::{
    AssetGroup, AssetKind, AssetStatus, DeckKind, JailMethod, PlayerStatus, PropertyStatus,
    RailroadStatus, UtilityStatus,
};

// Crate-level exports - Sessions and snapshots
pub use session::{PollResponse, Session, SessionError, SessionId, SessionManager};
pub use snapshot::{GameSnapshot, PlayerSnapshot, TileSnapshot};

// Crate-level exports - Invariants
pub use invariants::{
    ActivePlayerInvariant, GameInvariants, Invariant, InvariantSet, InvariantViolation,
    MonopolyTierInvariant, OwnershipInvariant, SolvencyInvariant, UniformBuildInvariant,
    assert_invariants,
};

// Crate-level exports - Bots
pub use bots::{BotAction, SimpleBot, simulate};
