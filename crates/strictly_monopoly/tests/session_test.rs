//! Tests for shared sessions and polling.

use strictly_monopoly::{ActionError, EventName, GameConfig, SessionManager};

#[test]
fn test_poll_returns_events_and_snapshot() {
    let manager = SessionManager::new(GameConfig::default().with_seed(8));
    let session = manager.create_session("table-1".to_string()).unwrap();
    let alice = session.register_player("Alice").unwrap();
    let bob = session.register_player("Bob").unwrap();
    session.start_game(&bob).unwrap();

    let polled = session.poll(&alice).unwrap();
    assert!(polled.snapshot.started);
    assert_eq!(polled.snapshot.players.len(), 2);
    assert!(polled.events.iter().any(|event| event.is(EventName::StartGame)));

    let again = session.poll(&alice).unwrap();
    assert!(again.events.is_empty());
}

#[test]
fn test_actions_through_session_handle() {
    let manager = SessionManager::new(GameConfig::default().with_seed(8));
    let session = manager.create_session("table-2".to_string()).unwrap();
    let alice = session.register_player("Alice").unwrap();
    session.register_player("Bob").unwrap();
    session.start_game(&alice).unwrap();

    let active = session
        .with_game_mut(|game| game.active_player_id().map(str::to_string))
        .unwrap();
    let waiting = session.with_game_mut(|game| {
        game.turn_order()
            .iter()
            .find(|id| **id != active)
            .cloned()
            .unwrap()
    });
    assert_eq!(session.roll_dice(&waiting), Err(ActionError::NotActivePlayer));
    assert!(session.roll_dice(&active).is_ok());
    assert!(session.snapshot().rolled_this_turn);
}

#[test]
fn test_poll_serializes_as_json() {
    let manager = SessionManager::default();
    let session = manager.create_session("table-3".to_string()).unwrap();
    let alice = session.register_player("Alice").unwrap();
    let json = serde_json::to_value(session.poll(&alice).unwrap()).unwrap();
    assert_eq!(json["events"][0]["name"], "playerJoin");
    assert_eq!(json["events"][0]["displayName"], "Alice");
    assert_eq!(json["snapshot"]["started"], false);
}
