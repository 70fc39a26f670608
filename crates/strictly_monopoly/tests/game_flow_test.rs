//! Scenario tests for whole turns through the public game API.

use serde_json::Value;
use strictly_monopoly::{
    ActionError, ActionResponse, Event, EventName, Game, GameConfig, GameInvariants,
    InvariantSet, LoadedDice, PlayerStatus, Roll,
};

/// Two-player game with scripted dice; returns (game, first, second).
fn two_players(config: GameConfig, rolls: Vec<Roll>) -> (Game, String, String) {
    let mut game = Game::with_dice(config.with_seed(21), LoadedDice::new(rolls)).unwrap();
    let a = game.register_player("Alice").unwrap();
    let b = game.register_player("Bob").unwrap();
    game.start_game(&a).unwrap();
    let first = game.turn_order()[0].clone();
    let second = game.turn_order()[1].clone();
    game.drain_events(&a).unwrap();
    game.drain_events(&b).unwrap();
    (game, first, second)
}

fn names(events: &[Event]) -> Vec<&str> {
    events.iter().filter_map(Event::name).collect()
}

#[test]
fn test_full_turn_cycle() {
    let (mut game, first, second) =
        two_players(GameConfig::default(), vec![Roll::new(1, 2), Roll::new(2, 3)]);

    game.roll_dice(&first).unwrap();
    game.buy_property(&first, 3).unwrap();
    game.end_turn(&first).unwrap();

    let seen_by_second = game.drain_events(&second).unwrap();
    assert_eq!(
        names(&seen_by_second),
        ["showRoll", "showMove", "showPurchase", "endTurn", "startTurn", "promptRoll"]
    );

    game.roll_dice(&second).unwrap();
    assert_eq!(*game.player(&second).unwrap().location(), 5);
    game.end_turn(&second).unwrap();
    assert_eq!(game.active_player_id(), Some(first.as_str()));
    assert!(GameInvariants::check_all(&game).is_ok());
}

#[test]
fn test_rejected_actions_leave_no_trace() {
    let (mut game, first, second) = two_players(GameConfig::default(), vec![Roll::new(1, 2)]);
    let before = game.snapshot();
    let history = game.history().len();

    assert_eq!(game.roll_dice(&second), Err(ActionError::NotActivePlayer));
    assert_eq!(game.buy_property(&first, 0), Err(ActionError::NotAnAsset(0)));
    assert_eq!(game.mortgage(&first, 39, true), Err(ActionError::NotOwner(39)));
    assert_eq!(game.end_turn(&first), Err(ActionError::MustRollFirst));
    assert_eq!(game.roll_dice("stranger"), Err(ActionError::UnknownPlayer));
    assert!(!ActionResponse::from(game.end_turn(&first)).success);

    assert_eq!(game.snapshot(), before);
    assert_eq!(game.history().len(), history);
    assert!(game.drain_events(&first).unwrap().is_empty());
    assert!(game.drain_events(&second).unwrap().is_empty());
}

#[test]
fn test_monopoly_doubles_rent() {
    let (mut game, first, second) =
        two_players(GameConfig::default(), vec![Roll::new(2, 4), Roll::new(1, 2)]);
    game.buy_property(&first, 1).unwrap();
    game.buy_property(&first, 3).unwrap();
    game.roll_dice(&first).unwrap();
    game.end_turn(&first).unwrap();

    game.roll_dice(&second).unwrap();
    assert_eq!(*game.player(&second).unwrap().money(), 1500 - 8);
    let rent = game
        .drain_events(&first)
        .unwrap()
        .into_iter()
        .find(|event| event.is(EventName::ShowRent))
        .unwrap();
    assert_eq!(rent.get("rent"), Some(&Value::from(8)));
    assert_eq!(rent.get("tileId"), Some(&Value::from(3)));
}

#[test]
fn test_in_the_hole_must_liquidate() {
    let config = GameConfig::default().with_starting_money(400);
    let (mut game, first, _) = two_players(config, vec![Roll::new(1, 3)]);
    game.buy_property(&first, 39).unwrap();
    assert_eq!(*game.player(&first).unwrap().money(), 0);
    game.drain_events(&first).unwrap();

    game.roll_dice(&first).unwrap();
    let player = game.player(&first).unwrap();
    assert_eq!(*player.status(), PlayerStatus::InTheHole);
    assert_eq!(*player.money(), -200);
    let events = game.drain_events(&first).unwrap();
    assert_eq!(
        names(&events),
        ["showRoll", "showMove", "showTax", "promptLiquidate"]
    );
    assert_eq!(events[3].get("money"), Some(&Value::from(-200)));

    assert_eq!(game.roll_dice(&first), Err(ActionError::MustLiquidate));
    assert_eq!(game.end_turn(&first), Err(ActionError::MustLiquidate));

    game.mortgage(&first, 39, true).unwrap();
    assert_eq!(*game.player(&first).unwrap().status(), PlayerStatus::Good);
    game.end_turn(&first).unwrap();
}

#[test]
fn test_bankruptcy_ends_two_player_game() {
    let config = GameConfig::default().with_starting_money(150);
    let (mut game, first, second) = two_players(config, vec![Roll::new(1, 3)]);
    game.buy_property(&first, 1).unwrap();

    game.roll_dice(&first).unwrap();
    let loser = game.player(&first).unwrap();
    assert_eq!(*loser.status(), PlayerStatus::Bankrupt);
    assert_eq!(*loser.money(), 0);
    assert!(loser.assets().is_empty());
    assert!(game.board().asset(1).unwrap().owner().is_none());

    let winner_seat = *game.winner().unwrap().seat();
    assert_eq!(game.winner().unwrap().id(), &second);
    let events = game.drain_events(&second).unwrap();
    let tail: Vec<_> = names(&events).into_iter().rev().take(2).collect();
    assert_eq!(tail, ["showGameOver", "showBankrupt"]);

    assert_eq!(game.roll_dice(&second), Err(ActionError::GameOver));
    assert_eq!(game.snapshot().winner_seat, Some(winner_seat));
    assert!(GameInvariants::check_all(&game).is_ok());
}

#[test]
fn test_card_tiles_announce_the_draw() {
    let (mut game, first, second) = two_players(GameConfig::default(), vec![Roll::new(3, 4)]);
    game.roll_dice(&first).unwrap();
    let draw = game
        .drain_events(&second)
        .unwrap()
        .into_iter()
        .find(|event| event.is(EventName::ShowCardDraw))
        .unwrap();
    assert_eq!(draw.get("deck"), Some(&Value::from("chance")));
    assert!(
        draw.get("description")
            .and_then(Value::as_str)
            .is_some_and(|text| !text.is_empty())
    );
}

#[test]
fn test_passing_go_pays_salary() {
    let (mut game, first, second) = two_players(
        GameConfig::default(),
        vec![
            Roll::new(4, 5),
            Roll::new(1, 2),
            Roll::new(4, 5),
            Roll::new(1, 2),
            Roll::new(4, 5),
            Roll::new(1, 2),
            Roll::new(4, 6),
            Roll::new(1, 2),
            Roll::new(1, 3),
        ],
    );
    for _ in 0..8 {
        let active = game.active_player_id().unwrap().to_string();
        game.roll_dice(&active).unwrap();
        game.end_turn(&active).unwrap();
    }
    assert_eq!(*game.player(&first).unwrap().location(), 37);
    let money = *game.player(&first).unwrap().money();
    game.drain_events(&second).unwrap();

    game.roll_dice(&first).unwrap();
    let player = game.player(&first).unwrap();
    assert_eq!(*player.location(), 1);
    assert_eq!(*player.money(), money + 200);
    let pass = game
        .drain_events(&second)
        .unwrap()
        .into_iter()
        .find(|event| event.is(EventName::ShowPassGo))
        .unwrap();
    assert_eq!(pass.get("amount"), Some(&Value::from(200)));
}
