//! Uniform build invariant: improvements are spread evenly over a monopoly.

use super::Invariant;
use crate::game::Game;
use crate::types::{AssetGroup, AssetKind};
use strum::IntoEnumIterator;

/// Invariant: improvement levels within a color group differ by at most
/// one, and only an unmortgaged group held by a single owner carries any.
pub struct UniformBuildInvariant;

impl Invariant<Game> for UniformBuildInvariant {
    fn holds(game: &Game) -> bool {
        let board = game.board();
        AssetGroup::iter()
            .filter(|group| group.kind() == AssetKind::Improvable)
            .all(|group| {
                let assets: Vec<_> = board
                    .group_tiles(group)
                    .into_iter()
                    .filter_map(|id| board.asset(id))
                    .collect();
                let levels = assets.iter().map(|asset| asset.improvements());
                let (Some(low), Some(high)) = (levels.clone().min(), levels.max()) else {
                    return true;
                };
                if high == 0 {
                    return true;
                }
                let owner = assets[0].owner.as_deref();
                high - low <= 1
                    && owner.is_some()
                    && assets
                        .iter()
                        .all(|asset| asset.owner.as_deref() == owner && !asset.is_mortgaged)
            })
    }

    fn description() -> &'static str {
        "Improvements are uniform across an unmortgaged monopoly"
    }
}
