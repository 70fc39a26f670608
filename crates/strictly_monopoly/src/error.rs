//! Rejection reasons for game actions.

use crate::rules::TileId;
use crate::types::JailMethod;
use serde::{Deserialize, Serialize};

/// Broad class of a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Wrong or unknown caller.
    Authorization,
    /// Action not allowed in the current phase of the game or turn.
    Phase,
    /// Action breaks a game rule.
    Rule,
}

/// Why a game action was rejected.
///
/// A rejected action leaves the game unchanged and emits no events.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ActionError {
    /// The caller is not a registered player.
    #[display("Unknown player")]
    UnknownPlayer,

    /// The caller is not the active player.
    #[display("Not the active player")]
    NotActivePlayer,

    /// The caller does not own the tile.
    #[display("Tile {} is not owned by the caller", _0)]
    NotOwner(TileId),

    /// The game has not started.
    #[display("Game has not started")]
    NotStarted,

    /// The game has already started.
    #[display("Game has already started")]
    AlreadyStarted,

    /// Registration is closed because the session is full.
    #[display("Session is full ({} players)", _0)]
    SessionFull(usize),

    /// Too few or too many players to start.
    #[display("Need {} to {} players, have {}", min, max, count)]
    PlayerCount {
        /// Minimum players.
        min: usize,
        /// Maximum players.
        max: usize,
        /// Registered players.
        count: usize,
    },

    /// The caller already rolled and must end the turn.
    #[display("Already rolled this turn")]
    MustEndTurn,

    /// The caller has not rolled this turn.
    #[display("Must roll before ending the turn")]
    MustRollFirst,

    /// The caller rolled doubles and must roll again.
    #[display("Rolled doubles, must roll again")]
    MustRollAgain,

    /// The caller owes money and must liquidate before rolling.
    #[display("Must raise money before rolling")]
    MustLiquidate,

    /// Only one player remains.
    #[display("Game is over")]
    GameOver,

    /// No other active player to pass the turn to.
    #[display("No other active player")]
    NoOtherPlayer,

    /// The display name is empty.
    #[display("Display name must not be empty")]
    EmptyName,

    /// No tile has this index.
    #[display("No tile {}", _0)]
    InvalidTile(TileId),

    /// The tile cannot be owned.
    #[display("Tile {} is not an asset", _0)]
    NotAnAsset(TileId),

    /// The tile cannot carry improvements.
    #[display("Tile {} cannot be improved", _0)]
    NotImprovable(TileId),

    /// The tile already has an owner.
    #[display("Tile {} is already owned", _0)]
    AlreadyOwned(TileId),

    /// The caller cannot pay.
    #[display("Costs {}, caller has {}", cost, money)]
    Unaffordable {
        /// Amount required.
        cost: i64,
        /// Money on hand.
        money: i64,
    },

    /// The caller does not hold the whole group.
    #[display("Tile {} is not part of a monopoly", _0)]
    NoMonopoly(TileId),

    /// The requested improvement change is out of bounds.
    #[display("Cannot change improvements on tile {} by {}", tile, delta)]
    ImprovementBounds {
        /// Tile targeted.
        tile: TileId,
        /// Requested change.
        delta: i32,
    },

    /// A tile in the group is mortgaged, so nothing can be built.
    #[display("Group of tile {} has a mortgaged tile", _0)]
    GroupMortgaged(TileId),

    /// The group carries improvements, so nothing can be mortgaged.
    #[display("Group of tile {} has improvements", _0)]
    GroupImproved(TileId),

    /// The tile is already in the requested mortgage state.
    #[display("Tile {} mortgaged state is already {}", tile, mortgaged)]
    MortgageState {
        /// Tile targeted.
        tile: TileId,
        /// Requested state.
        mortgaged: bool,
    },

    /// Lifting the mortgage would bankrupt the caller.
    #[display("Unmortgaging tile {} would bankrupt the caller", _0)]
    BankruptingUnmortgage(TileId),

    /// The caller is not in jail.
    #[display("Not in jail")]
    NotInJail,

    /// The caller holds no Get Out of Jail Free card.
    #[display("No jail card")]
    NoJailCard,

    /// The method cannot be requested directly.
    #[display("Cannot leave jail by {} on request", _0)]
    InvalidJailMethod(JailMethod),
}

impl std::error::Error for ActionError {}

impl ActionError {
    /// Taxonomy class of the rejection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::UnknownPlayer | ActionError::NotActivePlayer | ActionError::NotOwner(_) => {
                ErrorKind::Authorization
            }
            ActionError::NotStarted
            | ActionError::AlreadyStarted
            | ActionError::SessionFull(_)
            | ActionError::PlayerCount { .. }
            | ActionError::MustEndTurn
            | ActionError::MustRollFirst
            | ActionError::MustRollAgain
            | ActionError::MustLiquidate
            | ActionError::GameOver
            | ActionError::NoOtherPlayer => ErrorKind::Phase,
            _ => ErrorKind::Rule,
        }
    }
}

/// The success flag handed back to a transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// True when the action was applied.
    pub success: bool,
}

impl<T> From<&Result<T, ActionError>> for ActionResponse {
    fn from(result: &Result<T, ActionError>) -> Self {
        Self {
            success: result.is_ok(),
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResponse {
    fn from(result: Result<T, ActionError>) -> Self {
        Self::from(&result)
    }
}
