//! Client-visible notifications and their per-player delivery queues.

use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, instrument, warn};

/// Names of the events the engine emits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum EventName {
    /// A player registered.
    PlayerJoin,
    /// Tells a registered player they may start the game.
    StartGamePrompt,
    /// The game started.
    StartGame,
    /// A turn began.
    StartTurn,
    /// Asks the active player to roll.
    PromptRoll,
    /// Dice were rolled.
    ShowRoll,
    /// A player moved.
    ShowMove,
    /// A player passed Go.
    ShowPassGo,
    /// Offers the active player the tile they landed on.
    PromptPurchase,
    /// Rent was paid.
    ShowRent,
    /// A card was drawn.
    ShowCardDraw,
    /// Tax was paid.
    ShowTax,
    /// A player went to jail.
    ShowGoToJail,
    /// Asks the active player to raise money.
    PromptLiquidate,
    /// A player went bankrupt.
    ShowBankrupt,
    /// One player remains.
    ShowGameOver,
    /// Asks the active player to end the turn.
    PromptEndTurn,
    /// A tile was bought.
    ShowPurchase,
    /// Improvements on a tile changed.
    ShowImprovements,
    /// A tile was mortgaged or unmortgaged.
    ShowMortgageChange,
    /// A player left jail.
    ShowFreeFromJail,
    /// A turn ended.
    EndTurn,
}

/// Who receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Every player.
    Status,
    /// The active player only.
    Prompt,
    /// Every player, and recorded in the history.
    Update,
}

/// A serializable notification: a `name` plus event-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    parameters: Map<String, Value>,
}

impl Event {
    /// Key holding the event name.
    pub const NAME_KEY: &'static str = "name";

    /// Creates an event carrying only its name.
    pub fn new(name: EventName) -> Self {
        let mut parameters = Map::new();
        let name: &'static str = name.into();
        parameters.insert(Self::NAME_KEY.to_string(), Value::from(name));
        Self { parameters }
    }

    /// Adds a parameter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Wraps raw parameters, which may lack a name.
    pub fn from_parameters(parameters: Map<String, Value>) -> Self {
        Self { parameters }
    }

    /// The event name, if present.
    pub fn name(&self) -> Option<&str> {
        self.parameters.get(Self::NAME_KEY).and_then(Value::as_str)
    }

    /// A parameter by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Every parameter, including the name.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// True if this event is named `name`.
    pub fn is(&self, name: EventName) -> bool {
        let name: &'static str = name.into();
        self.name() == Some(name)
    }
}

/// Reasons an event cannot be enqueued or drained.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EventError {
    /// The event has no `name` parameter.
    #[display("Event has no name")]
    MissingName,

    /// The target or drained player has no queue.
    #[display("No event queue for player")]
    UnknownPlayer,

    /// A prompt was sent with nobody active to receive it.
    #[display("Prompt {} has no active player to receive it", _0)]
    NoActivePlayer(String),
}

impl std::error::Error for EventError {}

/// Per-player FIFO event queues plus the shared update history.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    queues: HashMap<PlayerId, Vec<Event>>,
    history: Vec<Event>,
}

impl EventQueue {
    /// Creates queues with no players.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty queue for `player`.
    pub fn register(&mut self, player: &str) {
        self.queues.entry(player.to_string()).or_default();
    }

    /// True if `player` has a queue.
    pub fn contains(&self, player: &str) -> bool {
        self.queues.contains_key(player)
    }

    /// Delivers `event`.
    ///
    /// With a `target`, only that player's queue receives it. Otherwise
    /// `scope` decides: status and update events go to every queue (updates
    /// are also recorded in the history), prompts go to `active` alone.
    #[instrument(skip(self, event, active, target), fields(event = event.name().unwrap_or("?"), %scope))]
    pub fn enqueue(
        &mut self,
        event: Event,
        scope: EventType,
        active: Option<&str>,
        target: Option<&str>,
    ) -> Result<(), EventError> {
        let Some(name) = event.name().map(str::to_string) else {
            warn!("Rejecting event without a name");
            return Err(EventError::MissingName);
        };
        if let Some(target) = target {
            let queue = self.queues.get_mut(target).ok_or(EventError::UnknownPlayer)?;
            queue.push(event);
            debug!("Targeted event delivered");
            return Ok(());
        }
        match scope {
            EventType::Prompt => {
                let queue = active
                    .and_then(|id| self.queues.get_mut(id))
                    .ok_or(EventError::NoActivePlayer(name))?;
                queue.push(event);
            }
            EventType::Status => {
                for queue in self.queues.values_mut() {
                    queue.push(event.clone());
                }
            }
            EventType::Update => {
                for queue in self.queues.values_mut() {
                    queue.push(event.clone());
                }
                self.history.push(event);
            }
        }
        debug!(queues = self.queues.len(), "Event delivered");
        Ok(())
    }

    /// Returns and clears `player`'s queue, oldest event first.
    pub fn drain(&mut self, player: &str) -> Result<Vec<Event>, EventError> {
        self.queues
            .get_mut(player)
            .map(std::mem::take)
            .ok_or(EventError::UnknownPlayer)
    }

    /// Events pending for `player` without draining them.
    pub fn pending(&self, player: &str) -> usize {
        self.queues.get(player).map_or(0, Vec::len)
    }

    /// Every update event so far, in order.
    pub fn history(&self) -> &[Event] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> EventQueue {
        let mut queue = EventQueue::new();
        queue.register("a");
        queue.register("b");
        queue
    }

    #[test]
    fn test_event_builder() {
        let event = Event::new(EventName::ShowRoll).with("seat", 1).with("first", 3);
        assert_eq!(event.name(), Some("showRoll"));
        assert!(event.is(EventName::ShowRoll));
        assert_eq!(event.get("first"), Some(&Value::from(3)));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "showRoll");
        assert_eq!(json["seat"], 1);
    }

    #[test]
    fn test_nameless_event_rejected() {
        let mut queue = queue();
        let result = queue.enqueue(
            Event::from_parameters(Map::new()),
            EventType::Update,
            None,
            None,
        );
        assert_eq!(result, Err(EventError::MissingName));
        assert_eq!(queue.pending("a"), 0);
        assert!(queue.history().is_empty());
    }

    #[test]
    fn test_scopes() {
        let mut queue = queue();
        queue
            .enqueue(Event::new(EventName::StartTurn), EventType::Status, Some("a"), None)
            .unwrap();
        queue
            .enqueue(Event::new(EventName::PromptRoll), EventType::Prompt, Some("a"), None)
            .unwrap();
        queue
            .enqueue(Event::new(EventName::ShowRoll), EventType::Update, Some("a"), None)
            .unwrap();

        assert_eq!(queue.pending("a"), 3);
        assert_eq!(queue.pending("b"), 2);
        assert_eq!(queue.history().len(), 1);
        assert!(queue.history()[0].is(EventName::ShowRoll));
    }

    #[test]
    fn test_target_bypasses_scope() {
        let mut queue = queue();
        queue
            .enqueue(
                Event::new(EventName::StartGamePrompt),
                EventType::Update,
                None,
                Some("b"),
            )
            .unwrap();
        assert_eq!(queue.pending("a"), 0);
        assert_eq!(queue.pending("b"), 1);
        assert!(queue.history().is_empty());
    }

    #[test]
    fn test_drain_is_fifo_and_clears() {
        let mut queue = queue();
        for name in [EventName::StartGame, EventName::StartTurn, EventName::ShowRoll] {
            queue.enqueue(Event::new(name), EventType::Update, None, None).unwrap();
        }
        let drained = queue.drain("a").unwrap();
        let names: Vec<_> = drained.iter().filter_map(Event::name).collect();
        assert_eq!(names, ["startGame", "startTurn", "showRoll"]);
        assert!(queue.drain("a").unwrap().is_empty());
        assert_eq!(queue.pending("b"), 3);
        assert_eq!(queue.drain("nobody"), Err(EventError::UnknownPlayer));
    }

    #[test]
    fn test_prompt_without_active_player() {
        let mut queue = queue();
        let result = queue.enqueue(
            Event::new(EventName::PromptRoll),
            EventType::Prompt,
            None,
            None,
        );
        assert_eq!(
            result,
            Err(EventError::NoActivePlayer("promptRoll".to_string()))
        );
    }
}
