//! Per-participant state and the single entry point that mutates it.

use crate::rules::{START_LOCATION, TileId};
use crate::tiles::Board;
use crate::types::{AssetGroup, DeckKind, PlayerStatus};
use crate::updates::PlayerUpdate;
use derive_getters::Getters;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, instrument};

/// Opaque player identifier, handed to the client as a bearer token.
pub type PlayerId = String;

/// A participant in a game.
///
/// Every change goes through [`Player::update`], so each mutation is a
/// discrete [`PlayerUpdate`] that can be logged and inspected.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Player {
    /// Identifier issued at registration.
    pub(crate) id: PlayerId,
    /// Name shown to other players.
    pub(crate) display_name: String,
    /// Registration order, used in place of the identifier in events.
    pub(crate) seat: usize,
    /// Cash on hand. Negative while in the hole.
    pub(crate) money: i64,
    /// Tile the player stands on.
    pub(crate) location: TileId,
    /// Consecutive doubles rolled this turn.
    pub(crate) doubles_streak: u8,
    /// Get Out of Jail Free cards held, by the deck each came from.
    pub(crate) jail_cards: Vec<DeckKind>,
    /// Turns left in jail, zero when free.
    pub(crate) turns_in_jail: u8,
    /// Solvency status.
    pub(crate) status: PlayerStatus,
    /// Asset tiles owned.
    pub(crate) assets: BTreeSet<TileId>,
}

impl Player {
    /// Creates a solvent player on Go.
    pub fn new(id: PlayerId, display_name: String, seat: usize, money: i64) -> Self {
        Self {
            id,
            display_name,
            seat,
            money,
            location: START_LOCATION,
            doubles_streak: 0,
            jail_cards: Vec::new(),
            turns_in_jail: 0,
            status: PlayerStatus::Good,
            assets: BTreeSet::new(),
        }
    }

    /// True while serving jail turns.
    pub fn in_jail(&self) -> bool {
        self.turns_in_jail > 0
    }

    /// True unless bankrupt or invalid.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Money plus the liquid value of every owned asset.
    pub fn net_worth(&self, board: &Board) -> i64 {
        self.money
            + self
                .assets
                .iter()
                .filter_map(|id| board.asset(*id))
                .map(|asset| asset.liquid_value())
                .sum::<i64>()
    }

    /// Number of tiles in `group` this player owns.
    pub fn group_share(&self, group: AssetGroup, board: &Board) -> usize {
        self.assets
            .iter()
            .filter_map(|id| board.asset(*id))
            .filter(|asset| *asset.group() == group)
            .count()
    }

    /// Applies `update` and every follow-up it produces, then reports the
    /// resulting status.
    ///
    /// Follow-ups run depth first: an update's follow-ups are all applied
    /// before the next queued update.
    #[instrument(skip(self, board), fields(seat = self.seat))]
    pub fn update(&mut self, update: PlayerUpdate, board: &mut Board) -> PlayerStatus {
        let mut pending = VecDeque::from([update]);
        while let Some(next) = pending.pop_front() {
            debug!(update = ?next, "Applying player update");
            let follow_ups = next.apply(self, board);
            for follow_up in follow_ups.into_iter().rev() {
                pending.push_front(follow_up);
            }
        }
        debug!(status = %self.status, money = self.money, "Player updated");
        self.status
    }
}
