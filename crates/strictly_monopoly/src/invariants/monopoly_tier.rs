//! Monopoly tier invariant: every asset's tier matches its owner's share.

use super::Invariant;
use crate::game::Game;
use crate::rules::group_size;
use crate::tiles::Board;
use crate::types::{AssetGroup, AssetStatus, PropertyStatus, UtilityStatus};

/// Invariant: asset tiers follow group ownership.
///
/// A property sits at or above the monopoly tier exactly when its owner
/// holds the whole group. A railroad's tier counts the railroads its owner
/// holds. A utility is at the monopoly tier exactly when both are held.
pub struct MonopolyTierInvariant;

fn share(board: &Board, group: AssetGroup, owner: &str) -> usize {
    board
        .group_tiles(group)
        .iter()
        .filter(|id| board.asset(**id).and_then(|asset| asset.owner.as_deref()) == Some(owner))
        .count()
}

impl Invariant<Game> for MonopolyTierInvariant {
    fn holds(game: &Game) -> bool {
        let board = game.board();
        board
            .tiles()
            .iter()
            .filter_map(|tile| tile.asset())
            .all(|asset| {
                let group = *asset.group();
                let share = asset
                    .owner
                    .as_deref()
                    .map_or(0, |owner| share(board, group, owner));
                let whole = share == group_size(group);
                match asset.status {
                    AssetStatus::Property(status) => whole == (status >= PropertyStatus::Monopoly),
                    AssetStatus::Railroad(status) => status as usize == share,
                    AssetStatus::Utility(status) => whole == (status == UtilityStatus::Monopoly),
                }
            })
    }

    fn description() -> &'static str {
        "Asset tiers match the owner's share of the group"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_fresh_board_holds() {
        let game = Game::new(GameConfig::default()).unwrap();
        assert!(MonopolyTierInvariant::holds(&game));
    }

    #[test]
    fn test_unowned_monopoly_violates() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        if let Some(asset) = game.board_mut().asset_mut(1) {
            asset.status = AssetStatus::Property(PropertyStatus::Monopoly);
        }
        assert!(!MonopolyTierInvariant::holds(&game));
    }
}
