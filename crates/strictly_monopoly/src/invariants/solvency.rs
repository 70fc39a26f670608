//! Solvency invariant: a player's status agrees with their balance.

use super::Invariant;
use crate::game::Game;
use crate::types::PlayerStatus;

/// Invariant: solvent players hold non-negative money, players in the hole
/// hold negative money, and bankrupt players hold nothing at all.
pub struct SolvencyInvariant;

impl Invariant<Game> for SolvencyInvariant {
    fn holds(game: &Game) -> bool {
        game.players().iter().all(|player| match player.status {
            PlayerStatus::Good => player.money >= 0,
            PlayerStatus::InTheHole => player.money < 0,
            PlayerStatus::Bankrupt => {
                player.money == 0 && player.assets.is_empty() && player.jail_cards.is_empty()
            }
            PlayerStatus::Invalid => true,
        })
    }

    fn description() -> &'static str {
        "Player status agrees with money and holdings"
    }
}
