//! The session state machine: turn order, validation, and event sequencing.

use crate::config::{ConfigError, GameConfig};
use crate::error::ActionError;
use crate::events::{Event, EventName, EventQueue, EventType};
use crate::invariants;
use crate::player::{Player, PlayerId};
use crate::roll::{Dice, RandomDice, Roll};
use crate::rules::{START_LOCATION, TileId};
use crate::snapshot::GameSnapshot;
use crate::tiles::{Board, TileKind};
use crate::types::{AssetKind, DeckKind, JailMethod, PlayerStatus};
use crate::updates::{PlayerUpdate, plan_improvements};
use rand::SeedableRng;
use rand::rngs::{OsRng, StdRng};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// Card moves that may chain into further landings within one roll.
const MAX_CHAINED_LANDINGS: usize = 3;

/// Result of a successful roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    /// Dice rolled.
    pub roll: Roll,
    /// True when the roller must roll again.
    pub roll_again: bool,
}

/// One game session.
///
/// Every method validates the caller and the phase before touching state;
/// a rejected call changes nothing and emits nothing.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    started: bool,
    players: HashMap<PlayerId, Player>,
    seats: Vec<PlayerId>,
    turn_order: Vec<PlayerId>,
    active_index: usize,
    board: Board,
    events: EventQueue,
    dice: Box<dyn Dice>,
    rng: StdRng,
    rolled_this_turn: bool,
    last_roll: Option<Roll>,
    eliminated: BTreeSet<PlayerId>,
    winner: Option<PlayerId>,
}

impl Game {
    /// Creates an unstarted game with PRNG dice.
    #[instrument(skip(config), fields(seed = ?config.seed()))]
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let dice = RandomDice::from_seed(*config.seed());
        Self::with_dice(config, dice)
    }

    /// Creates an unstarted game rolling `dice`.
    #[instrument(skip(config, dice))]
    pub fn with_dice(config: GameConfig, dice: impl Dice + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config
            .seed()
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        info!("Creating game");
        Ok(Self::fresh(config, Box::new(dice), rng))
    }

    fn fresh(config: GameConfig, dice: Box<dyn Dice>, rng: StdRng) -> Self {
        let board = Board::standard(*config.go_salary());
        Self {
            config,
            started: false,
            players: HashMap::new(),
            seats: Vec::new(),
            turn_order: Vec::new(),
            active_index: 0,
            board,
            events: EventQueue::new(),
            dice,
            rng,
            rolled_this_turn: false,
            last_roll: None,
            eliminated: BTreeSet::new(),
            winner: None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────

    /// Session configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True once the game has started.
    pub fn started(&self) -> bool {
        self.started
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A player by identifier.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Players in registration order.
    pub fn players(&self) -> Vec<&Player> {
        self.seats
            .iter()
            .filter_map(|id| self.players.get(id))
            .collect()
    }

    /// Player identifiers in turn order, empty until the game starts.
    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    /// Identifier of the player whose turn it is.
    pub fn active_player_id(&self) -> Option<&str> {
        if !self.started {
            return None;
        }
        self.turn_order.get(self.active_index).map(String::as_str)
    }

    /// The player whose turn it is.
    pub fn active_player(&self) -> Option<&Player> {
        self.active_player_id().and_then(|id| self.players.get(id))
    }

    /// True once the active player has rolled this turn.
    pub fn rolled_this_turn(&self) -> bool {
        self.rolled_this_turn
    }

    /// Most recent roll.
    pub fn last_roll(&self) -> Option<Roll> {
        self.last_roll
    }

    /// The last player standing, once the game is over.
    pub fn winner(&self) -> Option<&Player> {
        self.winner.as_deref().and_then(|id| self.players.get(id))
    }

    /// Every update event so far.
    pub fn history(&self) -> &[Event] {
        self.events.history()
    }

    /// Seat-keyed view of the whole game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    // ─────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────

    /// Registers a player and returns their identifier.
    #[instrument(skip(self))]
    pub fn register_player(&mut self, display_name: &str) -> Result<PlayerId, ActionError> {
        if self.started {
            warn!("Registration after start");
            return Err(ActionError::AlreadyStarted);
        }
        if self.players.len() >= *self.config.max_players() {
            warn!(players = self.players.len(), "Session full");
            return Err(ActionError::SessionFull(self.players.len()));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ActionError::EmptyName);
        }

        let id = self.generate_id();
        let seat = self.seats.len();
        let player = Player::new(
            id.clone(),
            display_name.to_string(),
            seat,
            *self.config.starting_money(),
        );
        self.players.insert(id.clone(), player);
        self.seats.push(id.clone());
        self.events.register(&id);
        info!(seat, "Player registered");

        self.emit(
            Event::new(EventName::PlayerJoin)
                .with("seat", seat)
                .with("displayName", display_name),
            EventType::Update,
        );
        self.emit_to(Event::new(EventName::StartGamePrompt), &id);
        Ok(id)
    }

    /// Random identifier that no registered player holds.
    fn generate_id(&self) -> PlayerId {
        let alphabet: Vec<char> = self.config.player_id_alphabet().chars().collect();
        loop {
            let id: PlayerId = (0..*self.config.player_id_length())
                .filter_map(|_| alphabet.choose(&mut OsRng))
                .collect();
            if !self.players.contains_key(&id) {
                return id;
            }
            debug!("Player id collision, regenerating");
        }
    }

    /// Starts the game, shuffling turn order and decks.
    #[instrument(skip(self, caller))]
    pub fn start_game(&mut self, caller: &str) -> Result<(), ActionError> {
        self.require_player(caller)?;
        if self.started {
            warn!("Duplicate start");
            return Err(ActionError::AlreadyStarted);
        }
        let count = self.players.len();
        let (min, max) = (*self.config.min_players(), *self.config.max_players());
        if !(min..=max).contains(&count) {
            warn!(count, min, max, "Wrong player count to start");
            return Err(ActionError::PlayerCount { min, max, count });
        }

        self.turn_order = self.seats.clone();
        self.turn_order.shuffle(&mut self.rng);
        self.board.shuffle_decks(&mut self.rng);
        self.started = true;
        self.active_index = 0;
        self.rolled_this_turn = false;

        let order: Vec<usize> = self.turn_order.iter().map(|id| self.seat_of(id)).collect();
        info!(?order, "Game started");
        self.emit(
            Event::new(EventName::StartGame).with("turnOrder", order),
            EventType::Update,
        );
        self.announce_turn();
        self.check_invariants();
        Ok(())
    }

    /// Rolls for the active player and resolves the landing.
    #[instrument(skip(self, caller))]
    pub fn roll_dice(&mut self, caller: &str) -> Result<RollOutcome, ActionError> {
        let player = self.require_active(caller)?;
        if player.status == PlayerStatus::InTheHole {
            warn!(seat = player.seat, "Roll while in the hole");
            return Err(ActionError::MustLiquidate);
        }
        if self.rolled_this_turn && player.doubles_streak == 0 {
            warn!(seat = player.seat, "Second roll without doubles");
            return Err(ActionError::MustEndTurn);
        }
        let seat = player.seat;
        let was_in_jail = player.in_jail();
        let start = player.location;

        let roll = self.dice.roll();
        self.rolled_this_turn = true;
        self.last_roll = Some(roll);
        self.apply(caller, PlayerUpdate::Roll(roll));
        let freed = was_in_jail && !self.player_in_jail(caller);
        info!(seat, %roll, "Dice rolled");
        self.emit(
            Event::new(EventName::ShowRoll)
                .with("seat", seat)
                .with("first", roll.first)
                .with("second", roll.second),
            EventType::Update,
        );

        let moved = !self.player_in_jail(caller) && (!was_in_jail || roll.is_doubles());
        if moved {
            let location = self.location_of(caller);
            self.emit(
                Event::new(EventName::ShowMove)
                    .with("seat", seat)
                    .with("location", location),
                EventType::Update,
            );
            if location < start && location != START_LOCATION {
                let salary = *self.config.go_salary();
                self.apply(caller, PlayerUpdate::Money { amount: salary });
                self.emit(
                    Event::new(EventName::ShowPassGo)
                        .with("seat", seat)
                        .with("amount", salary),
                    EventType::Update,
                );
            }
            self.resolve_landing(caller, roll);
        }

        let jailed = (!was_in_jail || freed) && self.player_in_jail(caller);
        if jailed {
            info!(seat, "Sent to jail");
            self.emit(
                Event::new(EventName::ShowGoToJail).with("seat", seat),
                EventType::Update,
            );
        }

        self.settle_bankruptcies();
        let outcome = |roll_again| RollOutcome { roll, roll_again };
        if self.winner.is_some() || self.active_player_id() != Some(caller) {
            self.check_invariants();
            return Ok(outcome(false));
        }
        if jailed {
            self.advance_turn();
            self.check_invariants();
            return Ok(outcome(false));
        }

        let Some(player) = self.players.get(caller) else {
            return Ok(outcome(false));
        };
        let (status, money, streak) = (player.status, player.money, player.doubles_streak);
        let roll_again = streak > 0;
        if status == PlayerStatus::InTheHole {
            self.emit(
                Event::new(EventName::PromptLiquidate).with("money", money),
                EventType::Prompt,
            );
        } else if roll_again {
            self.emit(Event::new(EventName::PromptRoll), EventType::Prompt);
        } else {
            self.emit(Event::new(EventName::PromptEndTurn), EventType::Prompt);
        }
        self.check_invariants();
        Ok(outcome(roll_again))
    }

    /// Announces and applies the landing on the caller's tile, following
    /// card moves onto their destinations.
    fn resolve_landing(&mut self, caller: &str, roll: Roll) {
        for _ in 0..MAX_CHAINED_LANDINGS {
            let Some(player) = self.players.get(caller) else {
                return;
            };
            let location = player.location;
            self.announce_landing(caller, location, roll);

            let others = self.other_active_players(caller);
            let Some(player) = self.players.get(caller) else {
                return;
            };
            let updates = self
                .board
                .land(location, player, roll, &others, &mut self.rng);
            debug!(location, updates = updates.len(), "Landing resolved");
            self.apply_all(updates);

            let Some(player) = self.players.get(caller) else {
                return;
            };
            if player.in_jail() || !player.is_active() || player.location == location {
                return;
            }
            let (seat, moved_to) = (player.seat, player.location);
            self.emit(
                Event::new(EventName::ShowMove)
                    .with("seat", seat)
                    .with("location", moved_to),
                EventType::Update,
            );
        }
        debug!("Stopped following chained landings");
    }

    /// Emits the event describing what the lander is about to face.
    fn announce_landing(&mut self, caller: &str, location: TileId, roll: Roll) {
        let seat = self.seat_of(caller);
        let Some(tile) = self.board.tile(location) else {
            return;
        };
        let event = match tile.kind() {
            TileKind::Asset(asset) => match asset.owner.as_deref() {
                None => Some((
                    Event::new(EventName::PromptPurchase)
                        .with("tileId", location)
                        .with("price", *asset.price()),
                    EventType::Prompt,
                )),
                Some(owner) if owner != caller && asset.rent(roll) > 0 => Some((
                    Event::new(EventName::ShowRent)
                        .with("seat", seat)
                        .with("ownerSeat", self.seat_of(owner))
                        .with("tileId", location)
                        .with("rent", asset.rent(roll)),
                    EventType::Update,
                )),
                Some(_) => None,
            },
            TileKind::Tax { amount } => Some((
                Event::new(EventName::ShowTax)
                    .with("seat", seat)
                    .with("tileId", location)
                    .with("amount", *amount),
                EventType::Update,
            )),
            TileKind::Card { deck } => {
                let deck = *deck;
                self.board
                    .deck_mut(deck)
                    .peek(&mut self.rng)
                    .map(|card| card.description().clone())
                    .map(|description| {
                        let name: &'static str = deck.into();
                        (
                            Event::new(EventName::ShowCardDraw)
                                .with("seat", seat)
                                .with("deck", name)
                                .with("description", description),
                            EventType::Update,
                        )
                    })
            }
            TileKind::Plain | TileKind::Go | TileKind::GoToJail => None,
        };
        if let Some((event, scope)) = event {
            self.emit(event, scope);
        }
    }

    /// Buys an unowned asset for the active player.
    #[instrument(skip(self, caller))]
    pub fn buy_property(&mut self, caller: &str, tile: TileId) -> Result<(), ActionError> {
        let player = self.require_active(caller)?;
        let money = player.money;
        let seat = player.seat;
        let asset = self.asset_at(tile)?;
        if asset.owner.is_some() {
            warn!(tile, "Tile already owned");
            return Err(ActionError::AlreadyOwned(tile));
        }
        let price = *asset.price();
        if price > money {
            warn!(tile, price, money, "Cannot afford tile");
            return Err(ActionError::Unaffordable { cost: price, money });
        }

        self.apply(caller, PlayerUpdate::Buy { tile });
        info!(seat, tile, price, "Tile bought");
        self.emit(
            Event::new(EventName::ShowPurchase)
                .with("seat", seat)
                .with("tileId", tile),
            EventType::Update,
        );
        self.check_invariants();
        Ok(())
    }

    /// Builds (positive `amount`) or sells (negative) improvements on a tile
    /// of a monopoly, keeping its group uniform.
    #[instrument(skip(self, caller))]
    pub fn improvements(
        &mut self,
        caller: &str,
        tile: TileId,
        amount: i32,
    ) -> Result<(), ActionError> {
        let player = self.require_active(caller)?;
        let money = player.money;
        let asset = self.asset_at(tile)?;
        if asset.kind() != AssetKind::Improvable {
            return Err(ActionError::NotImprovable(tile));
        }
        if asset.owner.as_deref() != Some(caller) {
            return Err(ActionError::NotOwner(tile));
        }
        if !asset.status.is_monopoly() {
            return Err(ActionError::NoMonopoly(tile));
        }
        let group = *asset.group();
        if amount > 0
            && self
                .board
                .group_tiles(group)
                .iter()
                .any(|id| self.board.asset(*id).is_some_and(|a| a.is_mortgaged))
        {
            return Err(ActionError::GroupMortgaged(tile));
        }
        let Some(plan) = plan_improvements(&self.board, caller, tile, amount) else {
            warn!(tile, amount, "Improvement out of bounds");
            return Err(ActionError::ImprovementBounds { tile, delta: amount });
        };
        if *plan.cost() > 0 && *plan.cost() > money {
            return Err(ActionError::Unaffordable {
                cost: *plan.cost(),
                money,
            });
        }

        let before: Vec<(TileId, u8)> = plan
            .levels()
            .iter()
            .map(|(id, _)| (*id, self.improvements_on(*id)))
            .collect();
        self.apply(caller, PlayerUpdate::Improvement { tile, delta: amount });

        let previous = before
            .iter()
            .find(|(id, _)| *id == tile)
            .map_or(0, |(_, level)| *level);
        let now = self.improvements_on(tile);
        if i32::from(now) - i32::from(previous) != amount {
            warn!(tile, amount, previous, now, "Improvement did not apply");
            self.check_invariants();
            return Ok(());
        }
        info!(tile, amount, cost = *plan.cost(), "Improvements changed");
        let changed = std::iter::once(tile).chain(
            before
                .iter()
                .filter(|(id, level)| *id != tile && self.improvements_on(*id) != *level)
                .map(|(id, _)| *id),
        );
        let events: Vec<Event> = changed
            .map(|id| {
                Event::new(EventName::ShowImprovements)
                    .with("tileId", id)
                    .with("number", self.improvements_on(id))
            })
            .collect();
        for event in events {
            self.emit(event, EventType::Update);
        }
        self.check_invariants();
        Ok(())
    }

    /// Mortgages or unmortgages one of the active player's tiles.
    #[instrument(skip(self, caller))]
    pub fn mortgage(&mut self, caller: &str, tile: TileId, mortgage: bool) -> Result<(), ActionError> {
        let player = self.require_active(caller)?;
        let money = player.money;
        let net_worth = player.net_worth(&self.board);
        let asset = self.asset_at(tile)?;
        if asset.owner.as_deref() != Some(caller) {
            warn!(tile, "Mortgage of a tile the caller does not own");
            return Err(ActionError::NotOwner(tile));
        }
        if asset.is_mortgaged == mortgage {
            return Err(ActionError::MortgageState {
                tile,
                mortgaged: mortgage,
            });
        }
        if mortgage {
            let group = *asset.group();
            let improved = self
                .board
                .group_tiles(group)
                .iter()
                .any(|id| self.improvements_on(*id) > 0);
            if improved {
                return Err(ActionError::GroupImproved(tile));
            }
        } else {
            let cost = asset.unmortgage_cost();
            if net_worth - cost < 0 {
                return Err(ActionError::BankruptingUnmortgage(tile));
            }
            if cost > money {
                return Err(ActionError::Unaffordable { cost, money });
            }
        }

        self.apply(caller, PlayerUpdate::Mortgage { tile, mortgage });
        info!(tile, mortgage, "Mortgage changed");
        self.emit(
            Event::new(EventName::ShowMortgageChange)
                .with("tileId", tile)
                .with("mortgaged", mortgage),
            EventType::Update,
        );
        self.check_invariants();
        Ok(())
    }

    /// Frees the active player from jail by paying the fee or using a card.
    #[instrument(skip(self, caller))]
    pub fn get_out_of_jail(&mut self, caller: &str, method: JailMethod) -> Result<(), ActionError> {
        let player = self.require_active(caller)?;
        if !player.in_jail() {
            return Err(ActionError::NotInJail);
        }
        let fee = *self.config.jail_fee();
        match method {
            JailMethod::Doubles => return Err(ActionError::InvalidJailMethod(method)),
            JailMethod::Card if player.jail_cards.is_empty() => return Err(ActionError::NoJailCard),
            JailMethod::Money if player.money < fee => {
                return Err(ActionError::Unaffordable {
                    cost: fee,
                    money: player.money,
                });
            }
            _ => {}
        }
        let seat = player.seat;
        let card_deck = player.jail_cards.last().copied();

        self.apply(caller, PlayerUpdate::LeaveJail { method, fee });
        if let (JailMethod::Card, Some(deck)) = (method, card_deck) {
            self.release_jail_card(deck);
        }
        info!(seat, %method, "Left jail");
        self.emit(
            Event::new(EventName::ShowFreeFromJail)
                .with("seat", seat)
                .with("method", method.to_string()),
            EventType::Update,
        );
        self.check_invariants();
        Ok(())
    }

    /// Ends the active player's turn and passes it to the next active
    /// player.
    #[instrument(skip(self, caller))]
    pub fn end_turn(&mut self, caller: &str) -> Result<(), ActionError> {
        let player = self.require_active(caller)?;
        if !self.rolled_this_turn {
            return Err(ActionError::MustRollFirst);
        }
        if player.status == PlayerStatus::InTheHole {
            warn!(seat = player.seat, "End of turn while in the hole");
            return Err(ActionError::MustLiquidate);
        }
        if player.doubles_streak > 0 {
            return Err(ActionError::MustRollAgain);
        }
        if self.next_active_index().is_none() {
            warn!("No other active player");
            return Err(ActionError::NoOtherPlayer);
        }
        self.advance_turn();
        self.check_invariants();
        Ok(())
    }

    /// Discards every player and returns the game to its unstarted state.
    #[instrument(skip(self, caller))]
    pub fn reset(&mut self, caller: &str) -> Result<(), ActionError> {
        self.require_player(caller)?;
        if !self.started {
            return Err(ActionError::NotStarted);
        }
        let config = self.config.clone();
        let dice = std::mem::replace(&mut self.dice, Box::new(RandomDice::seeded(0)));
        let rng = self.rng.clone();
        *self = Self::fresh(config, dice, rng);
        info!("Game reset");
        Ok(())
    }

    /// Returns and clears the caller's pending events.
    #[instrument(skip(self, caller))]
    pub fn drain_events(&mut self, caller: &str) -> Result<Vec<Event>, ActionError> {
        self.events
            .drain(caller)
            .map_err(|_| ActionError::UnknownPlayer)
    }

    // ─────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────

    fn require_player(&self, caller: &str) -> Result<&Player, ActionError> {
        self.players.get(caller).ok_or_else(|| {
            warn!("Unknown caller");
            ActionError::UnknownPlayer
        })
    }

    /// Caller must be the active player of a running game.
    fn require_active(&self, caller: &str) -> Result<&Player, ActionError> {
        let player = self.require_player(caller)?;
        if !self.started {
            return Err(ActionError::NotStarted);
        }
        if self.winner.is_some() {
            return Err(ActionError::GameOver);
        }
        if self.active_player_id() != Some(caller) {
            warn!(seat = player.seat, "Caller is not the active player");
            return Err(ActionError::NotActivePlayer);
        }
        Ok(player)
    }

    fn asset_at(&self, tile: TileId) -> Result<&crate::tiles::AssetTile, ActionError> {
        let found = self.board.tile(tile).ok_or(ActionError::InvalidTile(tile))?;
        found.asset().ok_or(ActionError::NotAnAsset(tile))
    }

    fn improvements_on(&self, tile: TileId) -> u8 {
        self.board.asset(tile).map_or(0, |asset| asset.improvements())
    }

    fn seat_of(&self, id: &str) -> usize {
        self.players.get(id).map_or(usize::MAX, |player| player.seat)
    }

    fn location_of(&self, id: &str) -> TileId {
        self.players.get(id).map_or(START_LOCATION, |player| player.location)
    }

    fn player_in_jail(&self, id: &str) -> bool {
        self.players.get(id).is_some_and(Player::in_jail)
    }

    fn other_active_players(&self, id: &str) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .filter(|other| other.as_str() != id)
            .filter(|other| self.players.get(*other).is_some_and(Player::is_active))
            .cloned()
            .collect()
    }

    fn apply(&mut self, id: &str, update: PlayerUpdate) -> PlayerStatus {
        match self.players.get_mut(id) {
            Some(player) => player.update(update, &mut self.board),
            None => {
                warn!(?update, "Update for unknown player");
                PlayerStatus::Invalid
            }
        }
    }

    fn apply_all(&mut self, updates: Vec<(PlayerId, PlayerUpdate)>) {
        for (id, update) in updates {
            self.apply(&id, update);
        }
    }

    /// Returns one held jail card to `deck`.
    fn release_jail_card(&mut self, deck: DeckKind) {
        if !self.board.deck_mut(deck).release_held() {
            debug!(%deck, "No held jail card to release");
        }
    }

    fn next_active_index(&self) -> Option<usize> {
        let len = self.turn_order.len();
        (1..len)
            .map(|offset| (self.active_index + offset) % len)
            .find(|index| {
                self.players
                    .get(&self.turn_order[*index])
                    .is_some_and(Player::is_active)
            })
    }

    /// Passes the turn on, announcing the end of the outgoing turn.
    fn advance_turn(&mut self) -> bool {
        let Some(next) = self.next_active_index() else {
            return false;
        };
        if let Some(outgoing) = self.active_player_id().map(str::to_string) {
            let seat = self.seat_of(&outgoing);
            if let Some(player) = self.players.get_mut(&outgoing) {
                player.doubles_streak = 0;
            }
            self.emit(Event::new(EventName::EndTurn).with("seat", seat), EventType::Update);
        }
        self.active_index = next;
        self.rolled_this_turn = false;
        self.announce_turn();
        true
    }

    fn announce_turn(&mut self) {
        let Some(active) = self.active_player_id() else {
            return;
        };
        let Some(player) = self.players.get(active) else {
            return;
        };
        let (seat, status, money) = (player.seat, player.status, player.money);
        debug!(seat, "Turn starts");
        self.emit(Event::new(EventName::StartTurn).with("seat", seat), EventType::Update);
        if status == PlayerStatus::InTheHole {
            self.emit(
                Event::new(EventName::PromptLiquidate).with("money", money),
                EventType::Prompt,
            );
        } else {
            self.emit(Event::new(EventName::PromptRoll), EventType::Prompt);
        }
    }

    /// Announces new bankruptcies, forecloses their assets, and ends the
    /// game or the bankrupt player's turn as needed.
    fn settle_bankruptcies(&mut self) {
        let newly: Vec<PlayerId> = self
            .turn_order
            .iter()
            .filter(|id| !self.eliminated.contains(*id))
            .filter(|id| {
                self.players
                    .get(*id)
                    .is_some_and(|player| player.status == PlayerStatus::Bankrupt)
            })
            .cloned()
            .collect();
        if newly.is_empty() {
            return;
        }

        for id in &newly {
            let foreclosed = self.board.foreclose(id);
            let cards = self
                .players
                .get_mut(id)
                .map(|player| {
                    player.assets.clear();
                    std::mem::take(&mut player.jail_cards)
                })
                .unwrap_or_default();
            for deck in cards {
                self.release_jail_card(deck);
            }
            self.eliminated.insert(id.clone());
            let seat = self.seat_of(id);
            info!(seat, foreclosed = foreclosed.len(), "Player bankrupt");
            self.emit(Event::new(EventName::ShowBankrupt).with("seat", seat), EventType::Update);
        }

        let remaining: Vec<PlayerId> = self
            .turn_order
            .iter()
            .filter(|id| self.players.get(*id).is_some_and(Player::is_active))
            .cloned()
            .collect();
        match remaining.as_slice() {
            [winner] => {
                if let Some(index) = self.turn_order.iter().position(|id| id == winner) {
                    self.active_index = index;
                }
                let seat = self.seat_of(winner);
                self.winner = Some(winner.clone());
                info!(seat, "Game over");
                self.emit(
                    Event::new(EventName::ShowGameOver).with("winnerSeat", seat),
                    EventType::Update,
                );
            }
            [] => warn!("Every player is bankrupt"),
            _ => {
                if self.active_player().is_some_and(|player| !player.is_active()) {
                    self.advance_turn();
                }
            }
        }
    }

    fn emit(&mut self, event: Event, scope: EventType) {
        let active = self
            .started
            .then(|| self.turn_order.get(self.active_index))
            .flatten()
            .cloned();
        if let Err(e) = self.events.enqueue(event, scope, active.as_deref(), None) {
            warn!(error = %e, "Event dropped");
        }
    }

    fn emit_to(&mut self, event: Event, target: &str) {
        if let Err(e) = self.events.enqueue(event, EventType::Status, None, Some(target)) {
            warn!(error = %e, "Event dropped");
        }
    }

    fn check_invariants(&self) {
        invariants::assert_invariants(self);
    }
}

#[cfg(test)]
impl Game {
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }
}
