use felt_engine::config::GameConfig;
use felt_engine::errors::GameError;
use felt_engine::game::{Game, Phase};
use felt_engine::history::ActionKind;
use felt_engine::player::{Player, PlayerAction};

fn table(seed: u64) -> Game {
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    Game::new("t1", "Main", config).expect("valid config")
}

fn heads_up() -> Game {
    let mut game = table(42);
    game.add_player(Player::new("alice", "Alice", 10_000, 0))
        .expect("seat alice");
    game.add_player(Player::new("bob", "Bob", 10_000, 1))
        .expect("seat bob");
    game
}

#[test]
fn waits_until_minimum_players_are_seated() {
    let mut game = table(1);
    game.add_player(Player::new("alice", "Alice", 10_000, 0))
        .expect("seat alice");
    assert_eq!(game.phase(), Phase::WaitingForPlayers);
    assert_eq!(game.hand_number(), 0);
    assert_eq!(
        game.process_action("alice", PlayerAction::Check),
        Err(GameError::NoHandInProgress)
    );
}

#[test]
fn second_player_starts_the_first_hand() {
    let game = heads_up();
    assert_eq!(game.phase(), Phase::PreFlop);
    assert_eq!(game.hand_number(), 1);
    assert_eq!(game.pot(), 150);
    assert_eq!(game.street_high(), 100);
    assert_eq!(game.min_raise(), 100);
    assert_eq!(game.dealer_id(), Some("alice"));
    assert_eq!(game.current_player_id(), Some("alice"));

    let alice = game.player("alice").expect("alice seated");
    let bob = game.player("bob").expect("bob seated");
    assert_eq!(alice.hole_cards().len(), 2);
    assert_eq!(bob.hole_cards().len(), 2);
    assert_eq!(alice.current_bet(), 50);
    assert_eq!(bob.current_bet(), 100);

    let kinds: Vec<ActionKind> = game.actions().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActionKind::PostSmallBlind, ActionKind::PostBigBlind]);
}

#[test]
fn call_and_check_move_to_the_flop() {
    let mut game = heads_up();
    assert_eq!(
        game.process_action("alice", PlayerAction::Call),
        Ok(None)
    );
    // big blind keeps the option
    assert_eq!(game.phase(), Phase::PreFlop);
    assert_eq!(game.current_player_id(), Some("bob"));

    game.process_action("bob", PlayerAction::Check)
        .expect("bob checks");
    assert_eq!(game.phase(), Phase::Flop);
    assert_eq!(game.pot(), 200);
    assert_eq!(game.community_cards().len(), 3);
    assert_eq!(game.street_high(), 0);
    assert!(game.players().all(|p| p.current_bet() == 0));
    // post-flop the player left of the button acts first
    assert_eq!(game.current_player_id(), Some("bob"));
}

#[test]
fn checking_down_reaches_showdown() {
    let mut game = heads_up();
    game.process_action("alice", PlayerAction::Call).expect("call");
    game.process_action("bob", PlayerAction::Check).expect("check");

    let mut summary = None;
    for street in [Phase::Flop, Phase::Turn, Phase::River] {
        assert_eq!(game.phase(), street);
        game.process_action("bob", PlayerAction::Check).expect("check");
        summary = game
            .process_action("alice", PlayerAction::Check)
            .expect("check");
    }

    let summary = summary.expect("hand settled at river");
    assert!(summary.went_to_showdown);
    assert_eq!(summary.board.len(), 5);
    assert_eq!(summary.pot, 200);
    assert_eq!(summary.showdown.len(), 2);
    assert_eq!(game.phase(), Phase::Showdown);
    assert_eq!(game.pot(), 0);
    assert_eq!(game.total_chips(), 20_000);
    let paid: u64 = summary.pots.iter().flat_map(|p| p.shares.iter()).sum();
    assert_eq!(paid, 200);
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut game = heads_up();
    assert_eq!(
        game.process_action("bob", PlayerAction::Check),
        Err(GameError::NotPlayersTurn {
            expected: "alice".to_string(),
            actual: "bob".to_string()
        })
    );
    assert_eq!(
        game.process_action("mallory", PlayerAction::Fold),
        Err(GameError::PlayerNotInGame("mallory".to_string()))
    );
}

#[test]
fn invalid_actions_leave_state_untouched() {
    let mut game = heads_up();
    assert!(matches!(
        game.process_action("alice", PlayerAction::Check),
        Err(GameError::InvalidAction(_))
    ));
    assert!(matches!(
        game.process_action("alice", PlayerAction::Raise(50)),
        Err(GameError::InvalidAction(_))
    ));
    assert!(matches!(
        game.process_action("alice", PlayerAction::Raise(20_000)),
        Err(GameError::InsufficientChips { .. })
    ));
    assert_eq!(game.pot(), 150);
    assert_eq!(game.current_player_id(), Some("alice"));
    assert_eq!(game.player("alice").map(|p| p.chips()), Some(9_950));
}

#[test]
fn raise_sets_new_minimum_and_reopens_action() {
    let mut game = heads_up();
    game.process_action("alice", PlayerAction::Raise(300))
        .expect("raise");
    assert_eq!(game.street_high(), 400);
    assert_eq!(game.min_raise(), 300);
    assert_eq!(game.pot(), 500);

    assert!(matches!(
        game.process_action("bob", PlayerAction::Raise(200)),
        Err(GameError::InvalidAction(_))
    ));
    game.process_action("bob", PlayerAction::Raise(300))
        .expect("re-raise");
    assert_eq!(game.street_high(), 700);
    assert_eq!(game.current_player_id(), Some("alice"));

    game.process_action("alice", PlayerAction::Call).expect("call");
    assert_eq!(game.phase(), Phase::Flop);
    assert_eq!(game.pot(), 1_400);
}

#[test]
fn fold_awards_pot_without_showdown() {
    let mut game = heads_up();
    let summary = game
        .process_action("alice", PlayerAction::Fold)
        .expect("fold")
        .expect("hand over");

    assert!(!summary.went_to_showdown);
    assert!(summary.showdown.is_empty());
    assert_eq!(summary.winners(), vec!["bob"]);
    assert_eq!(summary.pot, 150);
    assert_eq!(game.player("alice").map(|p| p.chips()), Some(9_950));
    assert_eq!(game.player("bob").map(|p| p.chips()), Some(10_050));
    assert_eq!(summary.result_for("alice").map(|r| r.net), Some(-50));
    assert_eq!(summary.result_for("bob").map(|r| r.net), Some(50));
    assert_eq!(game.phase(), Phase::Showdown);
    assert_eq!(
        game.process_action("bob", PlayerAction::Check),
        Err(GameError::NoHandInProgress)
    );
}

#[test]
fn scheduled_start_moves_the_button() {
    let mut game = heads_up();
    game.process_action("alice", PlayerAction::Fold).expect("fold");
    assert_eq!(game.awaiting_next_hand(), Some(1));

    // stale start is ignored
    assert_eq!(game.start_scheduled_hand(0), Ok(None));
    assert_eq!(game.phase(), Phase::Showdown);

    game.start_scheduled_hand(1).expect("next hand");
    assert_eq!(game.hand_number(), 2);
    assert_eq!(game.phase(), Phase::PreFlop);
    assert_eq!(game.dealer_id(), Some("bob"));
    assert_eq!(game.current_player_id(), Some("bob"));
    assert_eq!(game.awaiting_next_hand(), None);

    // a second start for the same hand does nothing
    assert_eq!(game.start_scheduled_hand(1), Ok(None));
    assert_eq!(game.hand_number(), 2);
}

#[test]
fn three_handed_blinds_follow_the_button() {
    let mut game = table(3);
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        game.add_player(Player::new(*id, *id, 10_000, i))
            .expect("seat");
    }
    // the hand starts as soon as two players sit; c joins mid-hand
    assert_eq!(game.hand_number(), 1);
    assert!(game.player("c").map(|p| p.is_folded()).unwrap_or(false));
    assert!(game.player("c").map(|p| p.hole_cards().is_empty()).unwrap_or(false));

    game.process_action("a", PlayerAction::Fold).expect("fold");
    game.start_scheduled_hand(1).expect("hand two");

    let snap = game.snapshot(None);
    assert_eq!(snap.dealer.as_deref(), Some("b"));
    assert_eq!(snap.small_blind_player.as_deref(), Some("c"));
    assert_eq!(snap.big_blind_player.as_deref(), Some("a"));
    assert_eq!(game.current_player_id(), Some("b"));
    assert!(game.players().all(|p| p.hole_cards().len() == 2));
}

#[test]
fn seating_rules_are_enforced() {
    let config = GameConfig {
        seed: Some(9),
        max_players: 2,
        ..GameConfig::default()
    };
    let mut game = Game::new("t2", "Small", config).expect("valid config");
    game.add_player(Player::new("a", "a", 5_000, 0)).expect("seat");
    assert_eq!(
        game.add_player(Player::new("a", "a", 5_000, 1)),
        Err(GameError::PlayerAlreadyInGame("a".to_string()))
    );
    assert!(matches!(
        game.add_player(Player::new("b", "b", 5_000, 0)),
        Err(GameError::InvalidAction(_))
    ));
    game.add_player(Player::new("b", "b", 5_000, 1)).expect("seat");
    assert_eq!(
        game.add_player(Player::new("c", "c", 5_000, 0)),
        Err(GameError::GameFull { max_players: 2 })
    );
}

#[test]
fn invalid_config_is_rejected() {
    let config = GameConfig {
        small_blind: 0,
        ..GameConfig::default()
    };
    assert!(matches!(
        Game::new("bad", "Bad", config),
        Err(GameError::InvalidConfig(_))
    ));
}
