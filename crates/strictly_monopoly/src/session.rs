//! Shared session handles for hosts serving one or more games.

use crate::config::{ConfigError, GameConfig};
use crate::error::ActionError;
use crate::events::Event;
use crate::game::{Game, RollOutcome};
use crate::player::PlayerId;
use crate::rules::TileId;
use crate::snapshot::GameSnapshot;
use crate::types::JailMethod;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Everything a client needs after a poll: its pending events and the
/// current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    /// Events drained from the caller's queue, oldest first.
    pub events: Vec<Event>,
    /// Game state after the drain.
    pub snapshot: GameSnapshot,
}

/// A game shared between request handlers.
///
/// Every call locks the game for its whole duration, so actions on one
/// session never interleave.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    game: Arc<Mutex<Game>>,
}

impl Session {
    /// Creates a session around a fresh game.
    #[instrument(skip(config))]
    pub fn new(id: SessionId, config: GameConfig) -> Result<Self, ConfigError> {
        let game = Game::new(config)?;
        info!(session_id = %id, "Creating new game session");
        Ok(Self::with_game(id, game))
    }

    /// Wraps an existing game.
    pub fn with_game(id: SessionId, game: Game) -> Self {
        Self {
            id,
            game: Arc::new(Mutex::new(game)),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Locks the game, recovering it if a previous holder panicked.
    fn lock(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(|poisoned| {
            warn!(session_id = %self.id, "Recovering poisoned session lock");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Runs `f` with exclusive access to the game.
    pub fn with_game_mut<T>(&self, f: impl FnOnce(&mut Game) -> T) -> T {
        f(&mut self.lock())
    }

    /// Registers a player.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn register_player(&self, display_name: &str) -> Result<PlayerId, ActionError> {
        self.lock().register_player(display_name)
    }

    /// Starts the game.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn start_game(&self, caller: &str) -> Result<(), ActionError> {
        self.lock().start_game(caller)
    }

    /// Rolls for the caller.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn roll_dice(&self, caller: &str) -> Result<RollOutcome, ActionError> {
        self.lock().roll_dice(caller)
    }

    /// Buys `tile` for the caller.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn buy_property(&self, caller: &str, tile: TileId) -> Result<(), ActionError> {
        self.lock().buy_property(caller, tile)
    }

    /// Builds or sells improvements.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn improvements(&self, caller: &str, tile: TileId, amount: i32) -> Result<(), ActionError> {
        self.lock().improvements(caller, tile, amount)
    }

    /// Mortgages or unmortgages `tile`.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn mortgage(&self, caller: &str, tile: TileId, mortgage: bool) -> Result<(), ActionError> {
        self.lock().mortgage(caller, tile, mortgage)
    }

    /// Frees the caller from jail.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn get_out_of_jail(&self, caller: &str, method: JailMethod) -> Result<(), ActionError> {
        self.lock().get_out_of_jail(caller, method)
    }

    /// Ends the caller's turn.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn end_turn(&self, caller: &str) -> Result<(), ActionError> {
        self.lock().end_turn(caller)
    }

    /// Resets the game.
    #[instrument(skip(self, caller), fields(session_id = %self.id))]
    pub fn reset(&self, caller: &str) -> Result<(), ActionError> {
        self.lock().reset(caller)
    }

    /// Drains the caller's events and captures the state under one lock.
    #[instrument(skip(self, player), fields(session_id = %self.id))]
    pub fn poll(&self, player: &str) -> Result<PollResponse, ActionError> {
        let mut game = self.lock();
        let events = game.drain_events(player)?;
        debug!(events = events.len(), "Polled");
        Ok(PollResponse {
            events,
            snapshot: game.snapshot(),
        })
    }

    /// Current state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().snapshot()
    }
}

/// Manages all game sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    config: GameConfig,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl SessionManager {
    /// Creates a manager whose sessions use `config`.
    #[instrument(skip(config))]
    pub fn new(config: GameConfig) -> Self {
        info!("Creating session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new game session.
    #[instrument(skip(self))]
    pub fn create_session(&self, id: SessionId) -> Result<Session, SessionError> {
        let mut sessions = self.lock();
        if sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionError::new(format!("Session {} already exists", id)));
        }
        let session = Session::new(id.clone(), self.config.clone())
            .map_err(|e| SessionError::new(format!("Invalid session config: {}", e.message)))?;
        sessions.insert(id.clone(), session.clone());
        info!(session_id = %id, "Created new session");
        Ok(session)
    }

    /// Gets a session by ID.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Option<Session> {
        let session = self.lock().get(id).cloned();
        if session.is_none() {
            debug!(session_id = id, "Session not found");
        }
        session
    }

    /// Removes a session, returning it if it existed.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Option<Session> {
        let removed = self.lock().remove(id);
        if removed.is_some() {
            info!(session_id = id, "Removed session");
        }
        removed
    }

    /// Lists all session IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let ids: Vec<_> = self.lock().keys().cloned().collect();
        info!(count = ids.len(), "Listed sessions");
        ids
    }
}

/// Session management error.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", message, file, line)]
pub struct SessionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use std::thread;

    #[test]
    fn test_create_and_get_session() {
        let manager = SessionManager::default();
        manager.create_session("one".to_string()).unwrap();
        assert!(manager.create_session("one".to_string()).is_err());
        assert!(manager.get_session("one").is_some());
        assert!(manager.get_session("two").is_none());
        assert_eq!(manager.list_sessions(), vec!["one".to_string()]);
        assert!(manager.remove_session("one").is_some());
        assert!(manager.list_sessions().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let manager = SessionManager::new(GameConfig::default().with_min_players(9));
        let err = manager.create_session("bad".to_string()).unwrap_err();
        assert!(err.message.contains("Invalid session config"));
    }

    #[test]
    fn test_handles_share_one_game() {
        let manager = SessionManager::new(GameConfig::default().with_seed(2));
        let session = manager.create_session("s".to_string()).unwrap();
        let id = session.register_player("a").unwrap();
        let other = manager.get_session("s").unwrap();
        assert_eq!(other.snapshot().players.len(), 1);

        let polled = other.poll(&id).unwrap();
        assert!(polled.events[0].is(EventName::PlayerJoin));
        assert!(session.poll(&id).unwrap().events.is_empty());
        assert_eq!(session.poll("nobody"), Err(ActionError::UnknownPlayer));
    }

    #[test]
    fn test_concurrent_registration_respects_capacity() {
        let session = Session::new(
            "busy".to_string(),
            GameConfig::default().with_max_players(4),
        )
        .unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = session.clone();
                thread::spawn(move || session.register_player(&format!("p{}", i)).is_ok())
            })
            .collect();
        let joined = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(joined, 4);
        assert_eq!(session.snapshot().players.len(), 4);
    }
}
