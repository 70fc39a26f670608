//! Chance and Community Chest cards and the decks that hold them.

use crate::player::{Player, PlayerId};
use crate::rules::{START_LOCATION, TileId};
use crate::tiles::Board;
use crate::types::{AssetGroup, DeckKind};
use crate::updates::PlayerUpdate;
use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// What happens to the player who draws a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardEffect {
    /// Signed money change for the drawer.
    Collect(i64),
    /// Every other active player pays the drawer this amount.
    ///
    /// Negative amounts make the drawer pay each of them.
    CollectFromEach(i64),
    /// Jump forward to a tile, collecting the Go salary when passing Go.
    AdvanceTo(TileId),
    /// Move by a signed number of spaces.
    MoveBy(i64),
    /// Jump forward to the next tile of a group.
    AdvanceToNearest(AssetGroup),
    /// Pay per house and per hotel owned.
    Repairs {
        /// Charge per tile with one to four improvements.
        per_house: i64,
        /// Charge per tile with a hotel.
        per_hotel: i64,
    },
    /// Go directly to jail.
    GoToJail,
    /// Keep until used to leave jail.
    GetOutOfJailFree,
}

impl CardEffect {
    /// True when the card stays with the drawer instead of resolving at once.
    pub fn is_held(&self) -> bool {
        matches!(self, CardEffect::GetOutOfJailFree)
    }

    /// Updates caused by `drawer` drawing this card from `deck`.
    ///
    /// `others` lists the other active players, in turn order.
    pub fn resolve(
        &self,
        deck: DeckKind,
        drawer: &Player,
        others: &[PlayerId],
        board: &Board,
    ) -> Vec<(PlayerId, PlayerUpdate)> {
        let me = drawer.id().clone();
        let location = *drawer.location();
        match *self {
            CardEffect::Collect(amount) => vec![(me, PlayerUpdate::Money { amount })],
            CardEffect::CollectFromEach(amount) => {
                let total = amount * others.len() as i64;
                let mut updates = vec![(me, PlayerUpdate::Money { amount: total })];
                updates.extend(
                    others
                        .iter()
                        .map(|other| (other.clone(), PlayerUpdate::Money { amount: -amount })),
                );
                updates
            }
            CardEffect::AdvanceTo(destination) => advance(me, location, destination, board),
            CardEffect::AdvanceToNearest(group) => {
                let destination = board.nearest(location, group);
                advance(me, location, destination, board)
            }
            CardEffect::MoveBy(spaces) => vec![(me, PlayerUpdate::Move { spaces })],
            CardEffect::Repairs {
                per_house,
                per_hotel,
            } => {
                let (houses, hotels) = drawer
                    .assets()
                    .iter()
                    .filter_map(|id| board.asset(*id))
                    .map(|asset| asset.improvements())
                    .fold((0i64, 0i64), |(houses, hotels), n| match n {
                        0 => (houses, hotels),
                        5 => (houses, hotels + 1),
                        _ => (houses + 1, hotels),
                    });
                let amount = -(houses * per_house + hotels * per_hotel);
                vec![(me, PlayerUpdate::Money { amount })]
            }
            CardEffect::GoToJail => vec![(me, PlayerUpdate::GoToJail)],
            CardEffect::GetOutOfJailFree => vec![(me, PlayerUpdate::JailCard { deck })],
        }
    }
}

/// Forward jump to `destination`, with the Go salary when it wraps past Go.
///
/// Landing exactly on Go is paid by the Go tile itself.
fn advance(
    me: PlayerId,
    from: TileId,
    destination: TileId,
    board: &Board,
) -> Vec<(PlayerId, PlayerUpdate)> {
    let mut updates = Vec::new();
    if destination < from && destination != START_LOCATION {
        updates.push((
            me.clone(),
            PlayerUpdate::Money {
                amount: *board.go_salary(),
            },
        ));
    }
    updates.push((me, PlayerUpdate::Location { destination }));
    updates
}

/// A single card.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Card {
    /// Card text.
    description: String,
    /// Effect on the drawer.
    effect: CardEffect,
    /// True while the card is held by a player and cannot be reshuffled.
    in_use: bool,
}

impl Card {
    /// Creates a card that is not in use.
    pub fn new(description: impl Into<String>, effect: CardEffect) -> Self {
        Self {
            description: description.into(),
            effect,
            in_use: false,
        }
    }
}

/// A draw pile plus its discards.
#[derive(Debug, Clone, Getters)]
pub struct Deck {
    /// Which deck this is.
    kind: DeckKind,
    /// Draw pile; the top card is the last element.
    stack: Vec<Card>,
    /// Drawn cards, including ones still held by players.
    discard: Vec<Card>,
}

impl Deck {
    /// Creates a deck whose draw pile is `cards`, top card last.
    pub fn new(kind: DeckKind, cards: Vec<Card>) -> Self {
        Self {
            kind,
            stack: cards,
            discard: Vec::new(),
        }
    }

    /// The standard sixteen-card deck of `kind`, unshuffled.
    pub fn standard(kind: DeckKind) -> Self {
        let cards = match kind {
            DeckKind::Chance => chance_cards(),
            DeckKind::CommunityChest => community_chest_cards(),
        };
        Self::new(kind, cards)
    }

    /// Draws the top card, reshuffling the free discards first if the pile
    /// is empty.
    ///
    /// Returns `None` when every card is held by a player.
    #[instrument(skip(self, rng), fields(deck = %self.kind))]
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.stack.is_empty() {
            self.reshuffle(rng);
        }
        let mut card = self.stack.pop()?;
        card.in_use = card.effect.is_held();
        debug!(description = %card.description, held = card.in_use, "Card drawn");
        self.discard.push(card.clone());
        Some(card)
    }

    /// The card the next [`Deck::draw`] will return.
    ///
    /// Follows the same reshuffle rule as `draw` but leaves the card on top.
    pub fn peek<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Card> {
        if self.stack.is_empty() {
            self.reshuffle(rng);
        }
        self.stack.last()
    }

    /// Returns every discard that is not in use to the draw pile and
    /// shuffles it.
    ///
    /// Held cards stay in the discard until released.
    #[instrument(skip(self, rng), fields(deck = %self.kind))]
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (held, free): (Vec<Card>, Vec<Card>) =
            self.discard.drain(..).partition(|card| card.in_use);
        self.discard = held;
        self.stack.extend(free);
        self.stack.shuffle(rng);
        debug!(
            stack = self.stack.len(),
            held = self.discard.len(),
            "Deck reshuffled"
        );
    }

    /// Marks one held card as returned so a later reshuffle reclaims it.
    ///
    /// Returns false if no card of this deck is held.
    pub fn release_held(&mut self) -> bool {
        match self.discard.iter_mut().find(|card| card.in_use) {
            Some(card) => {
                card.in_use = false;
                true
            }
            None => false,
        }
    }

    /// Number of cards of this deck currently held by players.
    pub fn held(&self) -> usize {
        self.discard.iter().filter(|card| card.in_use).count()
    }
}

fn chance_cards() -> Vec<Card> {
    vec![
        Card::new("Advance to Boardwalk", CardEffect::AdvanceTo(39)),
        Card::new("Advance to Go (Collect $200)", CardEffect::AdvanceTo(0)),
        Card::new("Advance to Illinois Avenue", CardEffect::AdvanceTo(24)),
        Card::new("Advance to St. Charles Place", CardEffect::AdvanceTo(11)),
        Card::new(
            "Advance to the nearest Railroad",
            CardEffect::AdvanceToNearest(AssetGroup::Railroad),
        ),
        Card::new(
            "Advance to the nearest Railroad",
            CardEffect::AdvanceToNearest(AssetGroup::Railroad),
        ),
        Card::new(
            "Advance to the nearest Utility",
            CardEffect::AdvanceToNearest(AssetGroup::Utility),
        ),
        Card::new("Bank pays you dividend of $50", CardEffect::Collect(50)),
        Card::new("Get Out of Jail Free", CardEffect::GetOutOfJailFree),
        Card::new("Go Back 3 Spaces", CardEffect::MoveBy(-3)),
        Card::new("Go to Jail", CardEffect::GoToJail),
        Card::new(
            "Make general repairs on all your property: $25 per house, $100 per hotel",
            CardEffect::Repairs {
                per_house: 25,
                per_hotel: 100,
            },
        ),
        Card::new("Speeding fine $15", CardEffect::Collect(-15)),
        Card::new("Take a trip to Reading Railroad", CardEffect::AdvanceTo(5)),
        Card::new(
            "You have been elected Chairman of the Board. Pay each player $50",
            CardEffect::CollectFromEach(-50),
        ),
        Card::new(
            "Your building loan matures. Collect $150",
            CardEffect::Collect(150),
        ),
    ]
}

fn community_chest_cards() -> Vec<Card> {
    vec![
        Card::new("Advance to Go (Collect $200)", CardEffect::AdvanceTo(0)),
        Card::new("Bank error in your favor. Collect $200", CardEffect::Collect(200)),
        Card::new("Doctor's fee. Pay $50", CardEffect::Collect(-50)),
        Card::new("From sale of stock you get $50", CardEffect::Collect(50)),
        Card::new("Get Out of Jail Free", CardEffect::GetOutOfJailFree),
        Card::new("Go to Jail", CardEffect::GoToJail),
        Card::new("Holiday fund matures. Receive $100", CardEffect::Collect(100)),
        Card::new("Income tax refund. Collect $20", CardEffect::Collect(20)),
        Card::new(
            "It is your birthday. Collect $10 from every player",
            CardEffect::CollectFromEach(10),
        ),
        Card::new("Life insurance matures. Collect $100", CardEffect::Collect(100)),
        Card::new("Pay hospital fees of $100", CardEffect::Collect(-100)),
        Card::new("Pay school fees of $50", CardEffect::Collect(-50)),
        Card::new("Receive $25 consultancy fee", CardEffect::Collect(25)),
        Card::new(
            "You are assessed for street repairs: $40 per house, $115 per hotel",
            CardEffect::Repairs {
                per_house: 40,
                per_hotel: 115,
            },
        ),
        Card::new(
            "You have won second prize in a beauty contest. Collect $10",
            CardEffect::Collect(10),
        ),
        Card::new("You inherit $100", CardEffect::Collect(100)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_standard_decks_have_sixteen_cards() {
        assert_eq!(Deck::standard(DeckKind::Chance).stack().len(), 16);
        assert_eq!(Deck::standard(DeckKind::CommunityChest).stack().len(), 16);
    }

    #[test]
    fn test_draw_moves_top_card_to_discard() {
        let mut deck = Deck::new(
            DeckKind::Chance,
            vec![
                Card::new("bottom", CardEffect::Collect(1)),
                Card::new("top", CardEffect::Collect(2)),
            ],
        );
        let card = deck.draw(&mut rng()).unwrap();
        assert_eq!(card.description(), "top");
        assert_eq!(deck.stack().len(), 1);
        assert_eq!(deck.discard().len(), 1);
        assert!(!*card.in_use());
    }

    #[test]
    fn test_reshuffle_keeps_held_cards_out() {
        let mut deck = Deck::new(
            DeckKind::CommunityChest,
            vec![
                Card::new("free", CardEffect::Collect(10)),
                Card::new("jail", CardEffect::GetOutOfJailFree),
            ],
        );
        let mut rng = rng();
        assert!(*deck.draw(&mut rng).unwrap().in_use());
        assert!(!*deck.draw(&mut rng).unwrap().in_use());
        assert!(deck.stack().is_empty());

        deck.reshuffle(&mut rng);
        assert_eq!(deck.stack().len(), 1);
        assert_eq!(deck.stack()[0].description(), "free");
        assert_eq!(deck.discard().len(), 1);
        assert_eq!(deck.discard()[0].description(), "jail");
    }

    #[test]
    fn test_draw_returns_none_when_all_cards_held() {
        let mut deck = Deck::new(
            DeckKind::Chance,
            vec![Card::new("jail", CardEffect::GetOutOfJailFree)],
        );
        let mut rng = rng();
        assert!(deck.draw(&mut rng).is_some());
        assert!(deck.draw(&mut rng).is_none());
        assert!(deck.peek(&mut rng).is_none());

        assert!(deck.release_held());
        assert_eq!(deck.held(), 0);
        assert!(deck.draw(&mut rng).is_some());
    }

    #[test]
    fn test_peek_matches_next_draw() {
        let mut deck = Deck::standard(DeckKind::Chance);
        let mut rng = rng();
        deck.reshuffle(&mut rng);
        let peeked = deck.peek(&mut rng).cloned().unwrap();
        assert_eq!(deck.stack().len(), 16);
        let drawn = deck.draw(&mut rng).unwrap();
        assert_eq!(peeked.description(), drawn.description());
    }

    #[test]
    fn test_collect_from_each_pays_drawer() {
        let board = Board::standard(200);
        let drawer = Player::new("a".into(), "A".into(), 0, 1500);
        let others = vec!["b".to_string(), "c".to_string()];
        let updates =
            CardEffect::CollectFromEach(10).resolve(DeckKind::Chance, &drawer, &others, &board);
        assert_eq!(
            updates,
            vec![
                ("a".to_string(), PlayerUpdate::Money { amount: 20 }),
                ("b".to_string(), PlayerUpdate::Money { amount: -10 }),
                ("c".to_string(), PlayerUpdate::Money { amount: -10 }),
            ]
        );
    }

    #[test]
    fn test_advance_pays_salary_when_wrapping() {
        let board = Board::standard(200);
        let mut drawer = Player::new("a".into(), "A".into(), 0, 1500);
        drawer.location = 36;
        let updates = CardEffect::AdvanceTo(11).resolve(DeckKind::Chance, &drawer, &[], &board);
        assert_eq!(
            updates,
            vec![
                ("a".to_string(), PlayerUpdate::Money { amount: 200 }),
                ("a".to_string(), PlayerUpdate::Location { destination: 11 }),
            ]
        );

        let to_go = CardEffect::AdvanceTo(0).resolve(DeckKind::Chance, &drawer, &[], &board);
        assert_eq!(
            to_go,
            vec![("a".to_string(), PlayerUpdate::Location { destination: 0 })]
        );
    }

    #[test]
    fn test_jail_card_remembers_its_deck() {
        let board = Board::standard(200);
        let drawer = Player::new("a".into(), "A".into(), 0, 1500);
        let updates =
            CardEffect::GetOutOfJailFree.resolve(DeckKind::CommunityChest, &drawer, &[], &board);
        assert_eq!(
            updates,
            vec![(
                "a".to_string(),
                PlayerUpdate::JailCard {
                    deck: DeckKind::CommunityChest
                }
            )]
        );
    }

    #[test]
    fn test_nearest_railroad() {
        let board = Board::standard(200);
        let mut drawer = Player::new("a".into(), "A".into(), 0, 1500);
        drawer.location = 36;
        let updates = CardEffect::AdvanceToNearest(AssetGroup::Railroad).resolve(
            DeckKind::Chance,
            &drawer,
            &[],
            &board,
        );
        assert_eq!(
            updates.last(),
            Some(&("a".to_string(), PlayerUpdate::Location { destination: 5 }))
        );
    }
}
