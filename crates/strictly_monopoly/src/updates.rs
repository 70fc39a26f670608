//! The closed set of commands that mutate a [`Player`].
//!
//! Each update applies itself to one player (and, for purchases,
//! improvements, and mortgages, the board) and returns the follow-up
//! updates it triggers. [`Player::update`] runs them to a fixed point.

use crate::player::Player;
use crate::roll::Roll;
use crate::rules::{DOUBLES_LIMIT, JAIL_LOCATION, JAIL_TURNS, MAX_IMPROVEMENTS, NUM_TILES, TileId};
use crate::tiles::Board;
use crate::types::{AssetKind, AssetStatus, DeckKind, JailMethod, PlayerStatus, PropertyStatus};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A single mutation of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerUpdate {
    /// Signed money change, recomputing solvency.
    Money {
        /// Positive credits, negative debits.
        amount: i64,
    },
    /// Relative move around the board.
    Move {
        /// Signed number of spaces.
        spaces: i64,
    },
    /// Absolute jump.
    Location {
        /// Target tile, ignored when off the board.
        destination: TileId,
    },
    /// Dice roll, driving jail and doubles rules.
    Roll(Roll),
    /// Purchase of an unowned asset.
    Buy {
        /// Tile bought.
        tile: TileId,
    },
    /// Build or sell improvements, keeping the group uniform.
    Improvement {
        /// Tile being improved.
        tile: TileId,
        /// Levels to add (positive) or remove (negative).
        delta: i32,
    },
    /// Mortgage or lift the mortgage on an owned asset.
    Mortgage {
        /// Tile affected.
        tile: TileId,
        /// True to mortgage, false to unmortgage.
        mortgage: bool,
    },
    /// Send the player to jail.
    GoToJail,
    /// Leave jail.
    LeaveJail {
        /// How the player gets out.
        method: JailMethod,
        /// Charged for [`JailMethod::Money`].
        fee: i64,
    },
    /// Receive a Get Out of Jail Free card.
    JailCard {
        /// Deck the card is returned to once used.
        deck: DeckKind,
    },
}

impl PlayerUpdate {
    /// Applies the update to `player` and returns its follow-ups.
    ///
    /// Updates whose preconditions do not hold leave everything untouched.
    pub fn apply(&self, player: &mut Player, board: &mut Board) -> Vec<PlayerUpdate> {
        match *self {
            PlayerUpdate::Money { amount } => {
                apply_money(player, board, amount);
                Vec::new()
            }
            PlayerUpdate::Move { spaces } => {
                let location = (player.location as i64 + spaces).rem_euclid(NUM_TILES as i64);
                player.location = location as TileId;
                Vec::new()
            }
            PlayerUpdate::Location { destination } => {
                if destination < NUM_TILES {
                    player.location = destination;
                } else {
                    warn!(destination, "Ignoring off-board location");
                }
                Vec::new()
            }
            PlayerUpdate::Roll(roll) => apply_roll(player, roll),
            PlayerUpdate::GoToJail => {
                if player.in_jail() {
                    return Vec::new();
                }
                player.doubles_streak = 0;
                player.turns_in_jail = JAIL_TURNS;
                vec![PlayerUpdate::Location {
                    destination: JAIL_LOCATION,
                }]
            }
            PlayerUpdate::LeaveJail { method, fee } => apply_leave_jail(player, method, fee),
            PlayerUpdate::JailCard { deck } => {
                player.jail_cards.push(deck);
                Vec::new()
            }
            PlayerUpdate::Buy { tile } => apply_buy(player, board, tile),
            PlayerUpdate::Improvement { tile, delta } => {
                let Some(plan) = plan_improvements(board, player.id(), tile, delta) else {
                    debug!(tile, delta, "Improvement not allowed");
                    return Vec::new();
                };
                for (id, level) in &plan.levels {
                    if let (Some(asset), Some(status)) = (
                        board.asset_mut(*id),
                        PropertyStatus::with_improvements(*level),
                    ) {
                        asset.status = AssetStatus::Property(status);
                    }
                }
                vec![PlayerUpdate::Money { amount: -plan.cost }]
            }
            PlayerUpdate::Mortgage { tile, mortgage } => {
                apply_mortgage(player, board, tile, mortgage)
            }
        }
    }
}

fn apply_money(player: &mut Player, board: &Board, amount: i64) {
    if !player.is_active() {
        debug!(amount, "Ignoring money update for inactive player");
        return;
    }
    if player.net_worth(board) + amount < 0 {
        player.money = 0;
        player.status = PlayerStatus::Bankrupt;
    } else if player.money + amount < 0 {
        player.money += amount;
        player.status = PlayerStatus::InTheHole;
    } else {
        player.money += amount;
        player.status = PlayerStatus::Good;
    }
}

fn apply_roll(player: &mut Player, roll: Roll) -> Vec<PlayerUpdate> {
    if !roll.is_valid() {
        warn!(%roll, "Ignoring roll outside the die range");
        return Vec::new();
    }
    let spaces = PlayerUpdate::Move {
        spaces: i64::from(roll.total()),
    };
    if player.in_jail() {
        if roll.is_doubles() {
            player.doubles_streak += 1;
            return vec![
                PlayerUpdate::LeaveJail {
                    method: JailMethod::Doubles,
                    fee: 0,
                },
                spaces,
            ];
        }
        player.turns_in_jail -= 1;
        return Vec::new();
    }
    if roll.is_doubles() {
        if player.doubles_streak + 1 >= DOUBLES_LIMIT {
            player.doubles_streak = 0;
            return vec![PlayerUpdate::GoToJail];
        }
        player.doubles_streak += 1;
    } else {
        player.doubles_streak = 0;
    }
    vec![spaces]
}

fn apply_leave_jail(player: &mut Player, method: JailMethod, fee: i64) -> Vec<PlayerUpdate> {
    if !player.in_jail() {
        return Vec::new();
    }
    match method {
        JailMethod::Doubles => {
            player.turns_in_jail = 0;
            Vec::new()
        }
        JailMethod::Money => {
            player.turns_in_jail = 0;
            vec![PlayerUpdate::Money { amount: -fee }]
        }
        JailMethod::Card if !player.jail_cards.is_empty() => {
            player.jail_cards.pop();
            player.turns_in_jail = 0;
            Vec::new()
        }
        JailMethod::Card => Vec::new(),
    }
}

fn apply_buy(player: &mut Player, board: &mut Board, tile: TileId) -> Vec<PlayerUpdate> {
    if player.assets.contains(&tile) {
        return Vec::new();
    }
    let Some(asset) = board.asset_mut(tile) else {
        warn!(tile, "Cannot buy a tile that is not an asset");
        return Vec::new();
    };
    asset.owner = Some(player.id.clone());
    let price = *asset.price();
    let group = *asset.group();
    player.assets.insert(tile);
    board.recompute_group(group);
    vec![PlayerUpdate::Money { amount: -price }]
}

fn apply_mortgage(
    player: &mut Player,
    board: &mut Board,
    tile: TileId,
    mortgage: bool,
) -> Vec<PlayerUpdate> {
    let net_worth = player.net_worth(board);
    let Some(asset) = board.asset_mut(tile) else {
        return Vec::new();
    };
    if asset.owner.as_ref() != Some(&player.id) {
        return Vec::new();
    }
    match (mortgage, asset.is_mortgaged) {
        (true, false) => {
            asset.is_mortgaged = true;
            vec![PlayerUpdate::Money {
                amount: asset.mortgage_price(),
            }]
        }
        (false, true) => {
            let cost = asset.unmortgage_cost();
            if net_worth - cost < 0 {
                debug!(tile, cost, net_worth, "Unmortgage would bankrupt the player");
                return Vec::new();
            }
            asset.is_mortgaged = false;
            vec![PlayerUpdate::Money { amount: -cost }]
        }
        _ => Vec::new(),
    }
}

/// Outcome of a build or sell request under the uniform-build rule.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ImprovementPlan {
    /// New improvement level of every tile in the group.
    levels: Vec<(TileId, u8)>,
    /// Net cost: positive to build, negative for a refund.
    cost: i64,
}

impl ImprovementPlan {
    /// New level of `tile`, if it belongs to the plan.
    pub fn level(&self, tile: TileId) -> Option<u8> {
        self.levels
            .iter()
            .find(|(id, _)| *id == tile)
            .map(|(_, level)| *level)
    }
}

/// Plans changing the improvements on `tile` by `delta` for `owner`.
///
/// Building raises every sibling to within one level of the new target
/// level at full cost; selling lowers siblings to within one level at half
/// cost refunded. Returns `None` when the change is not allowed: the tile
/// is not an improvable monopoly of `owner`, `delta` is zero or larger than
/// five levels, the result leaves `[0, 5]`, or a build touches a group with
/// a mortgaged tile.
pub fn plan_improvements(
    board: &Board,
    owner: &str,
    tile: TileId,
    delta: i32,
) -> Option<ImprovementPlan> {
    if delta == 0 || delta.unsigned_abs() > u32::from(MAX_IMPROVEMENTS) {
        return None;
    }
    let asset = board.asset(tile)?;
    if asset.kind() != AssetKind::Improvable
        || asset.owner.as_deref() != Some(owner)
        || !asset.status.is_monopoly()
    {
        return None;
    }
    let unit = asset.improvement_cost()?;
    let target = i32::from(asset.improvements()) + delta;
    if !(0..=i32::from(MAX_IMPROVEMENTS)).contains(&target) {
        return None;
    }
    let group = board.group_tiles(*asset.group());
    if delta > 0
        && group
            .iter()
            .any(|id| board.asset(*id).is_some_and(|sibling| sibling.is_mortgaged))
    {
        return None;
    }

    let mut levels = Vec::with_capacity(group.len());
    let mut cost = 0;
    for id in group {
        let current = i32::from(board.asset(id)?.improvements());
        let next = if id == tile {
            target
        } else if delta > 0 {
            current.max(target - 1)
        } else {
            current.min(target + 1)
        };
        let change = i64::from(next - current);
        cost += if change > 0 {
            change * unit
        } else {
            change * (unit / 2)
        };
        levels.push((id, u8::try_from(next).ok()?));
    }
    Some(ImprovementPlan { levels, cost })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(money: i64) -> Player {
        Player::new("p".into(), "P".into(), 0, money)
    }

    fn monopoly(board: &mut Board, p: &mut Player, tiles: &[TileId]) {
        for tile in tiles {
            p.update(PlayerUpdate::Buy { tile: *tile }, board);
        }
    }

    #[test]
    fn test_money_statuses() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        assert_eq!(p.update(PlayerUpdate::Money { amount: -100 }, &mut board), PlayerStatus::Good);
        assert_eq!(*p.money(), 1400);

        let mut p = player(1500);
        p.update(PlayerUpdate::Buy { tile: 39 }, &mut board);
        assert_eq!(
            p.update(PlayerUpdate::Money { amount: -1150 }, &mut board),
            PlayerStatus::InTheHole
        );
        assert_eq!(*p.money(), -50);
    }

    #[test]
    fn test_money_bankrupts_when_net_worth_negative() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        assert_eq!(
            p.update(PlayerUpdate::Money { amount: -1700 }, &mut board),
            PlayerStatus::Bankrupt
        );
        assert_eq!(*p.money(), 0);
    }

    #[test]
    fn test_move_wraps() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.location = 38;
        p.update(PlayerUpdate::Move { spaces: 5 }, &mut board);
        assert_eq!(*p.location(), 3);
        p.update(PlayerUpdate::Move { spaces: -5 }, &mut board);
        assert_eq!(*p.location(), 38);
        p.update(PlayerUpdate::Location { destination: 40 }, &mut board);
        assert_eq!(*p.location(), 38);
    }

    #[test]
    fn test_roll_moves_and_tracks_doubles() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Roll(Roll::new(2, 2)), &mut board);
        assert_eq!(*p.location(), 4);
        assert_eq!(*p.doubles_streak(), 1);
        p.update(PlayerUpdate::Roll(Roll::new(1, 2)), &mut board);
        assert_eq!(*p.location(), 7);
        assert_eq!(*p.doubles_streak(), 0);
    }

    #[test]
    fn test_invalid_roll_is_ignored() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Roll(Roll::new(0, 7)), &mut board);
        assert_eq!(*p.location(), 0);
    }

    #[test]
    fn test_third_double_goes_to_jail() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Roll(Roll::new(1, 1)), &mut board);
        p.update(PlayerUpdate::Roll(Roll::new(2, 2)), &mut board);
        assert_eq!(*p.location(), 6);
        p.update(PlayerUpdate::Roll(Roll::new(3, 3)), &mut board);
        assert_eq!(*p.location(), JAIL_LOCATION);
        assert_eq!(*p.turns_in_jail(), 3);
        assert_eq!(*p.doubles_streak(), 0);
    }

    #[test]
    fn test_jail_rolls() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::GoToJail, &mut board);
        p.update(PlayerUpdate::Roll(Roll::new(1, 2)), &mut board);
        assert_eq!(*p.turns_in_jail(), 2);
        assert_eq!(*p.location(), JAIL_LOCATION);

        p.update(PlayerUpdate::Roll(Roll::new(4, 4)), &mut board);
        assert!(!p.in_jail());
        assert_eq!(*p.location(), 18);
        assert_eq!(*p.doubles_streak(), 1);
    }

    #[test]
    fn test_leave_jail_methods() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::GoToJail, &mut board);
        p.update(
            PlayerUpdate::LeaveJail {
                method: JailMethod::Card,
                fee: 50,
            },
            &mut board,
        );
        assert!(p.in_jail());

        p.update(
            PlayerUpdate::JailCard {
                deck: DeckKind::CommunityChest,
            },
            &mut board,
        );
        p.update(
            PlayerUpdate::LeaveJail {
                method: JailMethod::Card,
                fee: 50,
            },
            &mut board,
        );
        assert!(!p.in_jail());
        assert!(p.jail_cards().is_empty());
        assert_eq!(*p.money(), 1500);

        p.update(PlayerUpdate::GoToJail, &mut board);
        p.update(
            PlayerUpdate::LeaveJail {
                method: JailMethod::Money,
                fee: 50,
            },
            &mut board,
        );
        assert!(!p.in_jail());
        assert_eq!(*p.money(), 1450);
    }

    #[test]
    fn test_buy_sets_owner_and_tier() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Buy { tile: 39 }, &mut board);
        assert_eq!(*p.money(), 1100);
        assert_eq!(board.asset(39).unwrap().owner.as_deref(), Some("p"));
        assert_eq!(
            board.asset(39).unwrap().status,
            AssetStatus::Property(PropertyStatus::NoMonopoly)
        );
        p.update(PlayerUpdate::Buy { tile: 39 }, &mut board);
        assert_eq!(*p.money(), 1100);
        p.update(PlayerUpdate::Buy { tile: 37 }, &mut board);
        assert!(board.asset(39).unwrap().status.is_monopoly());
    }

    #[test]
    fn test_uniform_build_and_sell() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        monopoly(&mut board, &mut p, &[1, 3]);
        assert_eq!(*p.money(), 1380);

        let plan = plan_improvements(&board, "p", 3, 5).unwrap();
        assert_eq!(*plan.cost(), 9 * 50);
        assert_eq!(plan.level(1), Some(4));
        assert_eq!(plan.level(3), Some(5));

        p.update(PlayerUpdate::Improvement { tile: 3, delta: 5 }, &mut board);
        assert_eq!(*p.money(), 1380 - 450);
        assert_eq!(board.asset(3).unwrap().improvements(), 5);
        assert_eq!(board.asset(1).unwrap().improvements(), 4);

        p.update(PlayerUpdate::Improvement { tile: 3, delta: -5 }, &mut board);
        assert_eq!(*p.money(), 1380 - 450 + 8 * 25);
        assert_eq!(board.asset(3).unwrap().improvements(), 0);
        assert_eq!(board.asset(1).unwrap().improvements(), 1);
    }

    #[test]
    fn test_improvement_bounds() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        monopoly(&mut board, &mut p, &[16, 18, 19]);
        assert_eq!(plan_improvements(&board, "p", 19, 5).map(|plan| *plan.cost()), Some(1300));
        assert!(plan_improvements(&board, "p", 19, 0).is_none());
        assert!(plan_improvements(&board, "p", 19, 6).is_none());
        assert!(plan_improvements(&board, "p", 19, -1).is_none());
        assert!(plan_improvements(&board, "other", 19, 1).is_none());
        assert!(plan_improvements(&board, "p", 5, 1).is_none());
    }

    #[test]
    fn test_no_build_without_monopoly_or_with_mortgage() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Buy { tile: 1 }, &mut board);
        assert!(plan_improvements(&board, "p", 1, 1).is_none());
        p.update(PlayerUpdate::Buy { tile: 3 }, &mut board);
        p.update(
            PlayerUpdate::Mortgage {
                tile: 1,
                mortgage: true,
            },
            &mut board,
        );
        assert!(plan_improvements(&board, "p", 3, 1).is_none());
    }

    #[test]
    fn test_mortgage_round_trip_costs() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(PlayerUpdate::Buy { tile: 39 }, &mut board);
        p.update(
            PlayerUpdate::Mortgage {
                tile: 39,
                mortgage: true,
            },
            &mut board,
        );
        assert!(board.asset(39).unwrap().is_mortgaged);
        assert_eq!(*p.money(), 1100 + 200);

        p.update(
            PlayerUpdate::Mortgage {
                tile: 39,
                mortgage: false,
            },
            &mut board,
        );
        assert!(!board.asset(39).unwrap().is_mortgaged);
        assert_eq!(*p.money(), 1300 - 220);
    }

    #[test]
    fn test_bankrupting_unmortgage_is_rejected() {
        let mut board = Board::standard(200);
        let mut p = player(400);
        p.update(PlayerUpdate::Buy { tile: 39 }, &mut board);
        p.update(
            PlayerUpdate::Mortgage {
                tile: 39,
                mortgage: true,
            },
            &mut board,
        );
        assert_eq!(*p.money(), 200);
        p.update(PlayerUpdate::Money { amount: -190 }, &mut board);
        p.update(
            PlayerUpdate::Mortgage {
                tile: 39,
                mortgage: false,
            },
            &mut board,
        );
        assert!(board.asset(39).unwrap().is_mortgaged);
        assert_eq!(*p.money(), 10);
    }

    #[test]
    fn test_mortgage_requires_ownership() {
        let mut board = Board::standard(200);
        let mut p = player(1500);
        p.update(
            PlayerUpdate::Mortgage {
                tile: 39,
                mortgage: true,
            },
            &mut board,
        );
        assert!(!board.asset(39).unwrap().is_mortgaged);
        assert_eq!(*p.money(), 1500);
    }
}
