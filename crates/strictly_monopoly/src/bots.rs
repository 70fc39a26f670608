//! Simple bot that plays a deterministic, cautious game.

use crate::error::ActionError;
use crate::game::Game;
use crate::player::Player;
use crate::rules::{MAX_IMPROVEMENTS, TileId};
use crate::types::{AssetKind, JailMethod, PlayerStatus};
use crate::updates::plan_improvements;
use tracing::{debug, instrument, warn};

/// Actions taken in one turn before the bot gives the turn up.
const MAX_ACTIONS_PER_TURN: usize = 64;

/// One move a bot can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    /// Roll the dice.
    Roll,
    /// Buy the tile.
    Buy(TileId),
    /// Add one improvement.
    Build(TileId),
    /// Sell one improvement.
    SellImprovement(TileId),
    /// Mortgage the tile.
    Mortgage(TileId),
    /// Pay the jail fee.
    PayJailFee,
    /// Use a Get Out of Jail Free card.
    UseJailCard,
    /// End the turn.
    EndTurn,
}

impl BotAction {
    /// Performs the action for `player`.
    pub fn perform(self, game: &mut Game, player: &str) -> Result<(), ActionError> {
        match self {
            BotAction::Roll => game.roll_dice(player).map(|_| ()),
            BotAction::Buy(tile) => game.buy_property(player, tile),
            BotAction::Build(tile) => game.improvements(player, tile, 1),
            BotAction::SellImprovement(tile) => game.improvements(player, tile, -1),
            BotAction::Mortgage(tile) => game.mortgage(player, tile, true),
            BotAction::PayJailFee => game.get_out_of_jail(player, JailMethod::Money),
            BotAction::UseJailCard => game.get_out_of_jail(player, JailMethod::Card),
            BotAction::EndTurn => game.end_turn(player),
        }
    }
}

/// A bot that keeps a cash reserve, buys what it lands on, builds evenly,
/// and liquidates only when it must.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleBot {
    reserve: i64,
}

impl Default for SimpleBot {
    fn default() -> Self {
        Self { reserve: 200 }
    }
}

impl SimpleBot {
    /// Creates a bot that keeps `reserve` money on hand.
    pub fn new(reserve: i64) -> Self {
        Self { reserve }
    }

    /// Next action for `id`, or `None` when it is not their turn.
    pub fn next_action(&self, game: &Game, id: &str) -> Option<BotAction> {
        if game.winner().is_some() || game.active_player_id() != Some(id) {
            return None;
        }
        let player = game.player(id)?;
        if player.status == PlayerStatus::InTheHole {
            return self.liquidate(game, player);
        }
        if !game.rolled_this_turn() || player.doubles_streak > 0 {
            if player.in_jail() && !game.rolled_this_turn() {
                if !player.jail_cards.is_empty() {
                    return Some(BotAction::UseJailCard);
                }
                if player.money >= *game.config().jail_fee() + self.reserve {
                    return Some(BotAction::PayJailFee);
                }
            }
            return Some(BotAction::Roll);
        }
        let spare = player.money - self.reserve;
        let here = player.location;
        if let Some(asset) = game.board().asset(here) {
            if asset.owner.is_none() && *asset.price() <= spare {
                return Some(BotAction::Buy(here));
            }
        }
        self.build(game, player, spare)
            .or(Some(BotAction::EndTurn))
    }

    fn build(&self, game: &Game, player: &Player, spare: i64) -> Option<BotAction> {
        let board = game.board();
        player
            .assets
            .iter()
            .copied()
            .filter(|tile| {
                board.asset(*tile).is_some_and(|asset| {
                    asset.kind() == AssetKind::Improvable
                        && asset.status.is_monopoly()
                        && asset.improvements() < MAX_IMPROVEMENTS
                })
            })
            .filter(|tile| {
                plan_improvements(board, &player.id, *tile, 1)
                    .is_some_and(|plan| *plan.cost() <= spare)
            })
            .min_by_key(|tile| board.asset(*tile).map_or(0, |asset| asset.improvements()))
            .map(BotAction::Build)
    }

    fn liquidate(&self, game: &Game, player: &Player) -> Option<BotAction> {
        let board = game.board();
        let improved = player
            .assets
            .iter()
            .copied()
            .filter(|tile| board.asset(*tile).is_some_and(|asset| asset.improvements() > 0))
            .max_by_key(|tile| board.asset(*tile).map_or(0, |asset| asset.improvements()));
        if let Some(tile) = improved {
            return Some(BotAction::SellImprovement(tile));
        }
        player
            .assets
            .iter()
            .copied()
            .find(|tile| board.asset(*tile).is_some_and(|asset| !asset.is_mortgaged))
            .map(BotAction::Mortgage)
    }
}

/// Plays `turns` turns with `bot` in every seat, stopping early when the
/// game ends. Returns the number of turns played.
#[instrument(skip(game, bot))]
pub fn simulate(game: &mut Game, bot: &SimpleBot, turns: usize) -> Result<usize, ActionError> {
    let mut played = 0;
    while played < turns && game.winner().is_none() {
        let Some(active) = game.active_player_id().map(str::to_string) else {
            break;
        };
        let mut actions = 0;
        while game.active_player_id() == Some(active.as_str()) && game.winner().is_none() {
            if actions == MAX_ACTIONS_PER_TURN {
                warn!(actions, "Turn did not finish");
                return Ok(played);
            }
            let Some(action) = bot.next_action(game, &active) else {
                return Ok(played);
            };
            debug!(?action, "Bot acting");
            action.perform(game, &active)?;
            actions += 1;
        }
        played += 1;
    }
    Ok(played)
}
