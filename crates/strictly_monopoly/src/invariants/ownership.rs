//! Ownership invariant: player holdings and tile owners agree.

use super::Invariant;
use crate::game::Game;
use std::collections::BTreeSet;

/// Invariant: each player's asset set is exactly the tiles naming them as
/// owner, and every owned tile names a registered player.
pub struct OwnershipInvariant;

impl Invariant<Game> for OwnershipInvariant {
    fn holds(game: &Game) -> bool {
        let board = game.board();
        let owned: Vec<_> = board
            .tiles()
            .iter()
            .filter_map(|tile| tile.asset().map(|asset| (*tile.id(), asset)))
            .filter_map(|(id, asset)| asset.owner.as_deref().map(|owner| (id, owner)))
            .collect();
        let registered = owned.iter().all(|(_, owner)| game.player(owner).is_some());
        registered
            && game.players().iter().all(|player| {
                let expected: BTreeSet<_> = owned
                    .iter()
                    .filter(|(_, owner)| *owner == player.id)
                    .map(|(id, _)| *id)
                    .collect();
                expected == player.assets
            })
    }

    fn description() -> &'static str {
        "Player holdings match tile owners"
    }
}
