//! Board constants and lookup tables.

use crate::types::AssetGroup;

/// Index of a tile on the board.
pub type TileId = usize;

/// Number of tiles on the board.
pub const NUM_TILES: usize = 40;

/// Location of the Go tile.
pub const START_LOCATION: TileId = 0;

/// Location of the jail tile.
pub const JAIL_LOCATION: TileId = 10;

/// Location of the Go to Jail tile.
pub const GO_TO_JAIL_LOCATION: TileId = 30;

/// Turns a player stays in jail unless released.
pub const JAIL_TURNS: u8 = 3;

/// Smallest die face.
pub const MIN_DIE: u8 = 1;

/// Largest die face.
pub const MAX_DIE: u8 = 6;

/// Consecutive doubles that send a player to jail.
pub const DOUBLES_LIMIT: u8 = 3;

/// Improvements a tile can carry (the fifth is the hotel).
pub const MAX_IMPROVEMENTS: u8 = 5;

/// Income tax, as a signed money delta.
pub const INCOME_TAX: i64 = -200;

/// Luxury tax, as a signed money delta.
pub const LUXURY_TAX: i64 = -100;

/// Purchase price of every railroad.
pub const RAILROAD_PRICE: i64 = 200;

/// Purchase price of every utility.
pub const UTILITY_PRICE: i64 = 150;

/// Rent per railroad tier, indexed by railroads owned.
pub const RAILROAD_RENTS: [i64; 5] = [0, 25, 50, 100, 200];

/// Utility rent multiplier with one utility owned.
pub const UTILITY_SINGLE_MULTIPLIER: i64 = 4;

/// Utility rent multiplier with both utilities owned.
pub const UTILITY_MONOPOLY_MULTIPLIER: i64 = 10;

/// Number of tiles in a group.
pub fn group_size(group: AssetGroup) -> usize {
    match group {
        AssetGroup::Brown | AssetGroup::DarkBlue | AssetGroup::Utility => 2,
        AssetGroup::Railroad => 4,
        _ => 3,
    }
}

/// Cost of one improvement for tiles in a color group.
///
/// Railroads and utilities cannot be improved.
pub fn improvement_cost(group: AssetGroup) -> Option<i64> {
    match group {
        AssetGroup::Brown | AssetGroup::LightBlue => Some(50),
        AssetGroup::Pink | AssetGroup::Orange => Some(100),
        AssetGroup::Red | AssetGroup::Yellow => Some(150),
        AssetGroup::Green | AssetGroup::DarkBlue => Some(200),
        AssetGroup::Railroad | AssetGroup::Utility => None,
    }
}

/// Rent schedule of an improvable tile: base rent, then rent with 1 to 5 improvements.
pub fn rent_schedule(tile: TileId) -> Option<[i64; 6]> {
    let schedule = match tile {
        1 => [2, 10, 30, 90, 160, 250],
        3 => [4, 20, 60, 180, 320, 450],
        6 | 8 => [6, 30, 90, 270, 400, 550],
        9 => [8, 40, 100, 300, 450, 600],
        11 | 13 => [10, 50, 150, 450, 625, 750],
        14 => [12, 60, 180, 500, 700, 900],
        16 | 18 => [14, 70, 200, 550, 750, 950],
        19 => [16, 80, 220, 600, 800, 1000],
        21 | 23 => [18, 90, 250, 700, 875, 1050],
        24 => [20, 100, 300, 750, 925, 1100],
        26 | 27 => [22, 110, 330, 800, 975, 1150],
        29 => [24, 120, 360, 850, 1025, 1200],
        31 | 32 => [26, 130, 390, 900, 1100, 1275],
        34 => [28, 150, 450, 1000, 1200, 1400],
        37 => [35, 175, 500, 1100, 1300, 1500],
        39 => [50, 200, 600, 1400, 1700, 2000],
        _ => return None,
    };
    Some(schedule)
}

/// Cost to lift a mortgage: the mortgage price plus 10%, rounded half up.
pub fn unmortgage_cost(mortgage_price: i64) -> i64 {
    (mortgage_price * 11 + 5) / 10
}
