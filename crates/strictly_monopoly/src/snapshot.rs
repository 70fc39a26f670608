//! Serializable views of a game for clients and logs.
//!
//! Snapshots identify players by seat, never by identifier, so they are
//! safe to hand to every participant.

use crate::game::Game;
use crate::player::Player;
use crate::roll::Roll;
use crate::rules::TileId;
use crate::tiles::{Board, Tile, TileKind};
use crate::types::{AssetGroup, DeckKind, PlayerStatus};
use serde::{Deserialize, Serialize};

/// Public state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Registration order.
    pub seat: usize,
    /// Name shown to other players.
    pub display_name: String,
    /// Money on hand.
    pub money: i64,
    /// Tile the player stands on.
    pub location: TileId,
    /// Consecutive doubles this turn.
    pub doubles_streak: u8,
    /// Get Out of Jail Free cards held.
    pub jail_cards: u32,
    /// Jail turns left.
    pub turns_in_jail: u8,
    /// True while in jail.
    pub in_jail: bool,
    /// Solvency status.
    pub status: PlayerStatus,
    /// Owned tiles.
    pub assets: Vec<TileId>,
    /// Money plus liquid asset value.
    pub net_worth: i64,
}

impl PlayerSnapshot {
    /// Captures `player`.
    pub fn capture(player: &Player, board: &Board) -> Self {
        Self {
            seat: player.seat,
            display_name: player.display_name.clone(),
            money: player.money,
            location: player.location,
            doubles_streak: player.doubles_streak,
            jail_cards: player.jail_cards.len() as u32,
            turns_in_jail: player.turns_in_jail,
            in_jail: player.in_jail(),
            status: player.status,
            assets: player.assets.iter().copied().collect(),
            net_worth: player.net_worth(board),
        }
    }
}

/// Public state of one tile. Asset fields are absent for other tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSnapshot {
    /// Board position.
    pub id: TileId,
    /// Display name.
    pub name: String,
    /// Tile behaviour: plain, go, goToJail, tax, card, or asset.
    pub kind: String,
    /// Purchase price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Asset group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<AssetGroup>,
    /// Seat of the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_seat: Option<usize>,
    /// Mortgage flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mortgaged: Option<bool>,
    /// Ownership tier label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Improvements built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<u8>,
    /// Signed tax amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<i64>,
    /// Deck drawn from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<DeckKind>,
}

impl TileSnapshot {
    /// Captures `tile`, resolving its owner to a seat.
    pub fn capture(tile: &Tile, seat_of: impl Fn(&str) -> Option<usize>) -> Self {
        let mut snapshot = Self {
            id: *tile.id(),
            name: tile.name().clone(),
            kind: String::new(),
            price: None,
            group: None,
            owner_seat: None,
            is_mortgaged: None,
            status: None,
            improvements: None,
            tax: None,
            deck: None,
        };
        let kind = match tile.kind() {
            TileKind::Plain => "plain",
            TileKind::Go => "go",
            TileKind::GoToJail => "goToJail",
            TileKind::Tax { amount } => {
                snapshot.tax = Some(*amount);
                "tax"
            }
            TileKind::Card { deck } => {
                snapshot.deck = Some(*deck);
                "card"
            }
            TileKind::Asset(asset) => {
                snapshot.price = Some(*asset.price());
                snapshot.group = Some(*asset.group());
                snapshot.owner_seat = asset.owner.as_deref().and_then(&seat_of);
                snapshot.is_mortgaged = Some(asset.is_mortgaged);
                snapshot.status = Some(asset.status.label().to_string());
                snapshot.improvements = Some(asset.improvements());
                "asset"
            }
        };
        snapshot.kind = kind.to_string();
        snapshot
    }
}

/// Public state of a whole game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// True once started.
    pub started: bool,
    /// Seat of the active player.
    pub active_seat: Option<usize>,
    /// Seats in turn order.
    pub turn_order: Vec<usize>,
    /// True once the active player has rolled.
    pub rolled_this_turn: bool,
    /// Most recent roll.
    pub last_roll: Option<Roll>,
    /// Players in seat order.
    pub players: Vec<PlayerSnapshot>,
    /// Every tile.
    pub tiles: Vec<TileSnapshot>,
    /// Seat of the winner, once the game is over.
    pub winner_seat: Option<usize>,
}

impl GameSnapshot {
    /// Captures `game`.
    pub fn capture(game: &Game) -> Self {
        let seat_of = |id: &str| game.player(id).map(|player| player.seat);
        let board = game.board();
        Self {
            started: game.started(),
            active_seat: game.active_player().map(|player| player.seat),
            turn_order: game
                .turn_order()
                .iter()
                .filter_map(|id| seat_of(id.as_str()))
                .collect(),
            rolled_this_turn: game.rolled_this_turn(),
            last_roll: game.last_roll(),
            players: game
                .players()
                .into_iter()
                .map(|player| PlayerSnapshot::capture(player, board))
                .collect(),
            tiles: board
                .tiles()
                .iter()
                .map(|tile| TileSnapshot::capture(tile, seat_of))
                .collect(),
            winner_seat: game.winner().map(|player| player.seat),
        }
    }

    /// Snapshot of the player in `seat`.
    pub fn player(&self, seat: usize) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|player| player.seat == seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_snapshot_of_new_game() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.register_player("Alice").unwrap();
        let snapshot = GameSnapshot::capture(&game);
        assert!(!snapshot.started);
        assert_eq!(snapshot.active_seat, None);
        assert_eq!(snapshot.tiles.len(), 40);
        let alice = snapshot.player(0).unwrap();
        assert_eq!(alice.display_name, "Alice");
        assert_eq!(alice.net_worth, 1500);
    }

    #[test]
    fn test_tile_json_omits_absent_fields() {
        let game = Game::new(GameConfig::default()).unwrap();
        let snapshot = GameSnapshot::capture(&game);
        let json = serde_json::to_value(&snapshot).unwrap();
        let go = &json["tiles"][0];
        assert_eq!(go["kind"], "go");
        assert!(go.get("price").is_none());
        let boardwalk = &json["tiles"][39];
        assert_eq!(boardwalk["kind"], "asset");
        assert_eq!(boardwalk["price"], 400);
        assert_eq!(boardwalk["status"], "NO_MONOPOLY");
        assert_eq!(boardwalk["group"], "darkBlue");
        assert!(boardwalk.get("ownerSeat").is_none());
    }

    #[test]
    fn test_snapshot_never_leaks_ids() {
        let mut game = Game::new(GameConfig::default().with_seed(1)).unwrap();
        let a = game.register_player("a").unwrap();
        game.register_player("b").unwrap();
        game.start_game(&a).unwrap();
        let json = serde_json::to_string(&GameSnapshot::capture(&game)).unwrap();
        assert!(!json.contains(&a));
    }
}
