//! Active player invariant: the turn always belongs to someone still playing.

use super::Invariant;
use crate::game::Game;

/// Invariant: once started, the turn order is a permutation of the
/// registered players and the active player is not bankrupt. A finished
/// game's winner is the only active player left.
pub struct ActivePlayerInvariant;

impl Invariant<Game> for ActivePlayerInvariant {
    fn holds(game: &Game) -> bool {
        if !game.started() {
            return game.turn_order().is_empty() && game.active_player_id().is_none();
        }
        let players = game.players();
        let permutation = game.turn_order().len() == players.len()
            && game
                .turn_order()
                .iter()
                .all(|id| game.player(id).is_some());
        if !permutation {
            return false;
        }
        let Some(active) = game.active_player() else {
            return false;
        };
        match game.winner() {
            Some(winner) => {
                winner.id == active.id
                    && players
                        .iter()
                        .filter(|player| player.is_active())
                        .count()
                        == 1
            }
            None => active.is_active(),
        }
    }

    fn description() -> &'static str {
        "The active player is still in the game"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::types::PlayerStatus;

    #[test]
    fn test_bankrupt_active_player_violates() {
        let mut game = Game::new(GameConfig::default().with_seed(5)).unwrap();
        let a = game.register_player("a").unwrap();
        game.register_player("b").unwrap();
        assert!(ActivePlayerInvariant::holds(&game));
        game.start_game(&a).unwrap();
        assert!(ActivePlayerInvariant::holds(&game));

        let active = game.active_player_id().unwrap().to_string();
        if let Some(player) = game.player_mut(&active) {
            player.status = PlayerStatus::Bankrupt;
        }
        assert!(!ActivePlayerInvariant::holds(&game));
    }
}
