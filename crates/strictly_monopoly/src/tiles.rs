//! Board cells, asset economics, and the standard board.

use crate::cards::Deck;
use crate::player::{Player, PlayerId};
use crate::roll::Roll;
use crate::rules::{
    GO_TO_JAIL_LOCATION, INCOME_TAX, JAIL_LOCATION, LUXURY_TAX, NUM_TILES, RAILROAD_PRICE,
    RAILROAD_RENTS, START_LOCATION, TileId, UTILITY_MONOPOLY_MULTIPLIER, UTILITY_PRICE,
    UTILITY_SINGLE_MULTIPLIER, group_size, improvement_cost, rent_schedule, unmortgage_cost,
};
use crate::types::{
    AssetGroup, AssetKind, AssetStatus, DeckKind, PropertyStatus, RailroadStatus, UtilityStatus,
};
use crate::updates::PlayerUpdate;
use derive_getters::Getters;
use rand::Rng;
use tracing::{debug, instrument, warn};

/// An ownable tile.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AssetTile {
    /// Purchase price.
    price: i64,
    /// Group the tile belongs to.
    group: AssetGroup,
    /// Owning player, resolved through the player table.
    pub(crate) owner: Option<PlayerId>,
    /// True while mortgaged.
    pub(crate) is_mortgaged: bool,
    /// Ownership tier.
    pub(crate) status: AssetStatus,
    /// Rent schedule of an improvable tile.
    #[getter(skip)]
    rents: Option<[i64; 6]>,
}

impl AssetTile {
    /// Creates an unowned asset. Improvable tiles take their rent schedule
    /// from the board position `id`.
    pub fn new(id: TileId, price: i64, group: AssetGroup) -> Self {
        let rents = match group.kind() {
            AssetKind::Improvable => rent_schedule(id),
            _ => None,
        };
        Self {
            price,
            group,
            owner: None,
            is_mortgaged: false,
            status: AssetStatus::initial(group),
            rents,
        }
    }

    /// Improvable, railroad, or utility.
    pub fn kind(&self) -> AssetKind {
        self.group.kind()
    }

    /// Credit for mortgaging the tile.
    pub fn mortgage_price(&self) -> i64 {
        self.price / 2
    }

    /// Debit for lifting the mortgage.
    pub fn unmortgage_cost(&self) -> i64 {
        unmortgage_cost(self.mortgage_price())
    }

    /// Improvements on the tile, zero for railroads and utilities.
    pub fn improvements(&self) -> u8 {
        self.status.improvements()
    }

    /// Cost of one improvement, `None` for railroads and utilities.
    pub fn improvement_cost(&self) -> Option<i64> {
        improvement_cost(self.group)
    }

    /// Rent owed by a player landing here with `roll`.
    pub fn rent(&self, roll: Roll) -> i64 {
        if self.owner.is_none() || self.is_mortgaged {
            return 0;
        }
        match self.status {
            AssetStatus::Property(status) => {
                let Some(rents) = self.rents else {
                    return 0;
                };
                match status {
                    PropertyStatus::NoMonopoly => rents[0],
                    PropertyStatus::Monopoly => rents[0] * 2,
                    improved => rents[usize::from(improved.improvements())],
                }
            }
            AssetStatus::Railroad(status) => RAILROAD_RENTS[status as usize],
            AssetStatus::Utility(UtilityStatus::NoMonopoly) => {
                i64::from(roll.total()) * UTILITY_SINGLE_MULTIPLIER
            }
            AssetStatus::Utility(UtilityStatus::Monopoly) => {
                i64::from(roll.total()) * UTILITY_MONOPOLY_MULTIPLIER
            }
        }
    }

    /// What the bank pays to liquidate the tile: mortgage price plus half
    /// the cost of each improvement. Zero once mortgaged.
    pub fn liquid_value(&self) -> i64 {
        if self.is_mortgaged {
            return 0;
        }
        let per_improvement = self.improvement_cost().unwrap_or(0) / 2;
        self.mortgage_price() + i64::from(self.improvements()) * per_improvement
    }
}

/// Behaviour of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKind {
    /// No effect (Jail, Free Parking).
    Plain,
    /// Pays the Go salary to a player landing on it.
    Go,
    /// Sends the lander to jail.
    GoToJail,
    /// Signed money change for the lander.
    Tax {
        /// Negative for a charge.
        amount: i64,
    },
    /// Draws from a deck.
    Card {
        /// Deck the tile draws from.
        deck: DeckKind,
    },
    /// Ownable tile.
    Asset(AssetTile),
}

/// A cell on the board.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Tile {
    /// Board position.
    id: TileId,
    /// Display name.
    name: String,
    /// Behaviour.
    pub(crate) kind: TileKind,
}

impl Tile {
    /// Creates a tile.
    pub fn new(id: TileId, name: impl Into<String>, kind: TileKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    /// The asset part of the tile, if it is ownable.
    pub fn asset(&self) -> Option<&AssetTile> {
        match &self.kind {
            TileKind::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// Updates caused by `lander` landing here with `roll`.
    ///
    /// Card tiles return nothing here; [`Board::land`] draws for them.
    pub fn land(
        &self,
        lander: &Player,
        roll: Roll,
        go_salary: i64,
    ) -> Vec<(PlayerId, PlayerUpdate)> {
        let me = lander.id().clone();
        match &self.kind {
            TileKind::Plain | TileKind::Card { .. } => Vec::new(),
            TileKind::Go => vec![(me, PlayerUpdate::Money { amount: go_salary })],
            TileKind::GoToJail => vec![(me, PlayerUpdate::GoToJail)],
            TileKind::Tax { amount } => vec![(me, PlayerUpdate::Money { amount: *amount })],
            TileKind::Asset(asset) => match &asset.owner {
                Some(owner) if *owner != me => {
                    let rent = asset.rent(roll);
                    if rent == 0 {
                        return Vec::new();
                    }
                    vec![
                        (me, PlayerUpdate::Money { amount: -rent }),
                        (owner.clone(), PlayerUpdate::Money { amount: rent }),
                    ]
                }
                _ => Vec::new(),
            },
        }
    }
}

/// The forty tiles and both card decks.
#[derive(Debug, Clone, Getters)]
pub struct Board {
    /// Tiles in board order.
    tiles: Vec<Tile>,
    /// Chance deck.
    chance: Deck,
    /// Community Chest deck.
    community_chest: Deck,
    /// Salary for landing on or passing Go.
    go_salary: i64,
}

impl Board {
    /// The classic board with standard decks.
    #[instrument]
    pub fn standard(go_salary: i64) -> Self {
        let tiles = vec![
            Tile::new(0, "Go", TileKind::Go),
            property(1, "Mediterranean Avenue", 60, AssetGroup::Brown),
            card(2, "Community Chest", DeckKind::CommunityChest),
            property(3, "Baltic Avenue", 60, AssetGroup::Brown),
            Tile::new(4, "Income Tax", TileKind::Tax { amount: INCOME_TAX }),
            railroad(5, "Reading Railroad"),
            property(6, "Oriental Avenue", 100, AssetGroup::LightBlue),
            card(7, "Chance", DeckKind::Chance),
            property(8, "Vermont Avenue", 100, AssetGroup::LightBlue),
            property(9, "Connecticut Avenue", 120, AssetGroup::LightBlue),
            Tile::new(JAIL_LOCATION, "Jail", TileKind::Plain),
            property(11, "St. Charles Place", 140, AssetGroup::Pink),
            utility(12, "Electric Company"),
            property(13, "States Avenue", 140, AssetGroup::Pink),
            property(14, "Virginia Avenue", 160, AssetGroup::Pink),
            railroad(15, "Pennsylvania Railroad"),
            property(16, "St. James Place", 180, AssetGroup::Orange),
            card(17, "Community Chest", DeckKind::CommunityChest),
            property(18, "Tennessee Avenue", 180, AssetGroup::Orange),
            property(19, "New York Avenue", 200, AssetGroup::Orange),
            Tile::new(20, "Free Parking", TileKind::Plain),
            property(21, "Kentucky Avenue", 220, AssetGroup::Red),
            card(22, "Chance", DeckKind::Chance),
            property(23, "Indiana Avenue", 220, AssetGroup::Red),
            property(24, "Illinois Avenue", 240, AssetGroup::Red),
            railroad(25, "B & O Railroad"),
            property(26, "Atlantic Avenue", 260, AssetGroup::Yellow),
            property(27, "Ventnor Avenue", 260, AssetGroup::Yellow),
            utility(28, "Water Works"),
            property(29, "Marvin Gardens", 280, AssetGroup::Yellow),
            Tile::new(GO_TO_JAIL_LOCATION, "Go To Jail", TileKind::GoToJail),
            property(31, "Pacific Avenue", 300, AssetGroup::Green),
            property(32, "North Carolina Avenue", 300, AssetGroup::Green),
            card(33, "Community Chest", DeckKind::CommunityChest),
            property(34, "Pennsylvania Avenue", 320, AssetGroup::Green),
            railroad(35, "Short Line Railroad"),
            card(36, "Chance", DeckKind::Chance),
            property(37, "Park Place", 350, AssetGroup::DarkBlue),
            Tile::new(38, "Luxury Tax", TileKind::Tax { amount: LUXURY_TAX }),
            property(39, "Boardwalk", 400, AssetGroup::DarkBlue),
        ];
        debug_assert_eq!(tiles.len(), NUM_TILES);
        Self {
            tiles,
            chance: Deck::standard(DeckKind::Chance),
            community_chest: Deck::standard(DeckKind::CommunityChest),
            go_salary,
        }
    }

    /// Tile at `id`.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// Asset at `id`, if that tile is ownable.
    pub fn asset(&self, id: TileId) -> Option<&AssetTile> {
        self.tile(id).and_then(Tile::asset)
    }

    pub(crate) fn asset_mut(&mut self, id: TileId) -> Option<&mut AssetTile> {
        match self.tiles.get_mut(id).map(|tile| &mut tile.kind) {
            Some(TileKind::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    /// Ids of every tile in `group`, in board order.
    pub fn group_tiles(&self, group: AssetGroup) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|tile| tile.asset().is_some_and(|asset| asset.group == group))
            .map(|tile| tile.id)
            .collect()
    }

    /// First tile of `group` strictly ahead of `from`, wrapping past Go.
    pub fn nearest(&self, from: TileId, group: AssetGroup) -> TileId {
        (1..=NUM_TILES)
            .map(|step| (from + step) % NUM_TILES)
            .find(|id| self.asset(*id).is_some_and(|asset| asset.group == group))
            .unwrap_or(from)
    }

    /// Deck of `kind`.
    pub fn deck(&self, kind: DeckKind) -> &Deck {
        match kind {
            DeckKind::Chance => &self.chance,
            DeckKind::CommunityChest => &self.community_chest,
        }
    }

    /// Mutable deck of `kind`.
    pub fn deck_mut(&mut self, kind: DeckKind) -> &mut Deck {
        match kind {
            DeckKind::Chance => &mut self.chance,
            DeckKind::CommunityChest => &mut self.community_chest,
        }
    }

    /// Shuffles both decks.
    pub fn shuffle_decks<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.chance.reshuffle(rng);
        self.community_chest.reshuffle(rng);
    }

    /// Resets every tile of `group` to the tier its owner's share implies.
    ///
    /// Improvement levels survive as long as the owner keeps the monopoly.
    #[instrument(skip(self))]
    pub fn recompute_group(&mut self, group: AssetGroup) {
        let ids = self.group_tiles(group);
        let owners: Vec<Option<PlayerId>> = ids
            .iter()
            .map(|id| self.asset(*id).and_then(|asset| asset.owner.clone()))
            .collect();
        let size = group_size(group);
        for (id, owner) in ids.iter().zip(&owners) {
            let share = owner
                .as_ref()
                .map_or(0, |o| owners.iter().filter(|other| other.as_ref() == Some(o)).count());
            let Some(asset) = self.asset_mut(*id) else {
                continue;
            };
            asset.status = match (asset.status, owner) {
                (_, None) => AssetStatus::initial(group),
                (AssetStatus::Railroad(_), Some(_)) => AssetStatus::Railroad(
                    RailroadStatus::from_repr(share.min(size) as u8)
                        .unwrap_or(RailroadStatus::FourOwned),
                ),
                (AssetStatus::Utility(_), Some(_)) if share == size => {
                    AssetStatus::Utility(UtilityStatus::Monopoly)
                }
                (AssetStatus::Utility(_), Some(_)) => {
                    AssetStatus::Utility(UtilityStatus::NoMonopoly)
                }
                (AssetStatus::Property(current), Some(_)) if share == size => {
                    AssetStatus::Property(current.max(PropertyStatus::Monopoly))
                }
                (AssetStatus::Property(_), Some(_)) => {
                    AssetStatus::Property(PropertyStatus::NoMonopoly)
                }
            };
            debug!(tile = id, share, status = %asset.status, "Recomputed tier");
        }
    }

    /// Returns every asset owned by `owner` to the bank.
    #[instrument(skip(self, owner))]
    pub fn foreclose(&mut self, owner: &str) -> Vec<TileId> {
        let mut foreclosed = Vec::new();
        let mut groups = Vec::new();
        for tile in &mut self.tiles {
            if let TileKind::Asset(asset) = &mut tile.kind {
                if asset.owner.as_deref() == Some(owner) {
                    asset.owner = None;
                    asset.is_mortgaged = false;
                    foreclosed.push(tile.id);
                    if !groups.contains(&asset.group) {
                        groups.push(asset.group);
                    }
                }
            }
        }
        for group in groups {
            self.recompute_group(group);
        }
        foreclosed
    }

    /// Updates caused by `lander` landing on `tile`.
    ///
    /// Card tiles draw from their deck; `others` are the other active
    /// players, needed for cards that collect from everyone.
    #[instrument(skip(self, lander, others, rng), fields(seat = lander.seat()))]
    pub fn land<R: Rng + ?Sized>(
        &mut self,
        tile: TileId,
        lander: &Player,
        roll: Roll,
        others: &[PlayerId],
        rng: &mut R,
    ) -> Vec<(PlayerId, PlayerUpdate)> {
        let deck = match self.tiles.get(tile) {
            None => {
                warn!(tile, "Landing on a tile that does not exist");
                return Vec::new();
            }
            Some(Tile {
                kind: TileKind::Card { deck },
                ..
            }) => *deck,
            Some(landed) => return landed.land(lander, roll, self.go_salary),
        };
        match self.deck_mut(deck).draw(rng) {
            Some(card) => card.effect().resolve(deck, lander, others, self),
            None => {
                debug!(%deck, "No card available");
                Vec::new()
            }
        }
    }
}

fn property(id: TileId, name: &str, price: i64, group: AssetGroup) -> Tile {
    Tile::new(id, name, TileKind::Asset(AssetTile::new(id, price, group)))
}

fn railroad(id: TileId, name: &str) -> Tile {
    Tile::new(
        id,
        name,
        TileKind::Asset(AssetTile::new(id, RAILROAD_PRICE, AssetGroup::Railroad)),
    )
}

fn utility(id: TileId, name: &str) -> Tile {
    Tile::new(
        id,
        name,
        TileKind::Asset(AssetTile::new(id, UTILITY_PRICE, AssetGroup::Utility)),
    )
}

fn card(id: TileId, name: &str, deck: DeckKind) -> Tile {
    Tile::new(id, name, TileKind::Card { deck })
}
