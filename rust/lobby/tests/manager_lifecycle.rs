use std::sync::{Arc, Mutex};

use chrono::Utc;
use felt_engine::config::GameOptions;
use felt_engine::errors::GameError;
use felt_engine::game::Phase;
use felt_engine::history::HandSummary;
use felt_engine::player::PlayerAction;
use felt_lobby::{EventSink, LobbyError, LobbySettings, LogCapture, TableEvent, TableManager};

#[derive(Default, Clone)]
struct RecordingSink {
    events: Arc<Mutex<Vec<TableEvent>>>,
}

impl EventSink for RecordingSink {
    fn publish(&self, event: TableEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RecordingSink {
    fn closed(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                TableEvent::TableClosed { game_id, reason } => {
                    Some((game_id.clone(), reason.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn last_summary(&self) -> Option<HandSummary> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|e| match e {
                TableEvent::HandFinished { summary } => Some((**summary).clone()),
                _ => None,
            })
    }

    fn finished_hands(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, TableEvent::HandFinished { .. }))
            .count()
    }
}

fn setup_with(settings: LobbySettings) -> (TableManager, RecordingSink) {
    let sink = RecordingSink::default();
    let manager = TableManager::new(settings, Arc::new(sink.clone())).expect("manager");
    (manager, sink)
}

fn setup() -> (TableManager, RecordingSink) {
    setup_with(LobbySettings::default())
}

fn seeded() -> GameOptions {
    GameOptions::new().with_seed(17)
}

#[test]
fn second_join_deals_the_first_hand() {
    let (manager, sink) = setup();
    manager.create_game("t1", "Main", &seeded()).expect("create");
    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    assert_eq!(
        manager.get_game_state("t1", None).expect("state").phase,
        Phase::WaitingForPlayers
    );

    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");
    let state = manager.get_game_state("t1", Some("alice")).expect("state");
    assert_eq!(state.phase, Phase::PreFlop);
    assert_eq!(state.pot, 150);
    assert!(state.can_act);
    assert_eq!(
        state.player("alice").and_then(|p| p.hole_cards.as_ref()).map(Vec::len),
        Some(2)
    );
    assert!(state.player("bob").and_then(|p| p.hole_cards.as_ref()).is_none());

    assert_eq!(manager.tables_for("alice"), vec!["t1".to_string()]);
    // create + two joins
    assert_eq!(sink.events.lock().unwrap().len(), 3);
}

#[test]
fn join_validates_table_buy_in_and_limits() {
    let settings = LobbySettings {
        max_tables_per_player: 2,
        ..Default::default()
    };
    let (manager, _) = setup_with(settings);
    for id in ["t1", "t2", "t3"] {
        manager.create_game(id, id, &seeded()).expect("create");
    }

    assert_eq!(
        manager.join_game("nope", "alice", "Alice", 10_000),
        Err(LobbyError::GameNotFound("nope".to_string()))
    );
    assert_eq!(
        manager.join_game("t1", "alice", "Alice", 1_000),
        Err(LobbyError::InvalidBuyIn {
            amount: 1_000,
            min: 2_000,
            max: 50_000
        })
    );

    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    assert_eq!(
        manager.join_game("t1", "alice", "Alice", 10_000),
        Err(LobbyError::Game(GameError::PlayerAlreadyInGame(
            "alice".to_string()
        )))
    );
    manager.join_game("t2", "alice", "Alice", 10_000).expect("join");
    assert_eq!(
        manager.join_game("t3", "alice", "Alice", 10_000),
        Err(LobbyError::TooManyTables {
            player: "alice".to_string(),
            limit: 2
        })
    );
    assert_eq!(manager.tables_for("alice").len(), 2);
}

#[test]
fn buy_in_bounds_come_from_the_table() {
    let (manager, _) = setup();
    manager
        .create_game(
            "micro",
            "Micro",
            &seeded().with_blinds(1, 2).with_buy_in(200, 100, 400),
        )
        .expect("create");
    manager.join_game("micro", "a", "a", 150).expect("join");
    assert!(matches!(
        manager.join_game("micro", "b", "b", 1_000),
        Err(LobbyError::InvalidBuyIn { max: 400, .. })
    ));
}

#[test]
fn tables_cannot_admit_empty_stacks() {
    let (manager, _) = setup();
    assert!(matches!(
        manager.create_game("free", "Free", &seeded().with_buy_in(0, 0, 400)),
        Err(LobbyError::InvalidConfig(_))
    ));
    assert_eq!(manager.game_count(), 0);
}

#[test]
fn full_table_rejects_joins() {
    let (manager, _) = setup();
    manager
        .create_game("hu", "Heads-up", &seeded().with_player_limits(2, 2))
        .expect("create");
    manager.join_game("hu", "a", "a", 5_000).expect("join");
    manager.join_game("hu", "b", "b", 5_000).expect("join");
    assert_eq!(
        manager.join_game("hu", "c", "c", 5_000),
        Err(LobbyError::Game(GameError::GameFull { max_players: 2 }))
    );
    assert!(manager.tables_for("c").is_empty());
}

#[test]
fn joins_take_the_lowest_free_seat() {
    let (manager, _) = setup();
    manager
        .create_game("t1", "Main", &seeded().with_player_limits(4, 6))
        .expect("create");
    for id in ["a", "b", "c"] {
        manager.join_game("t1", id, id, 5_000).expect("join");
    }
    // between hands the stack comes straight back
    assert_eq!(manager.leave_game("t1", "b"), Ok(Some(5_000)));
    assert!(manager.tables_for("b").is_empty());

    manager.join_game("t1", "d", "d", 5_000).expect("join");
    let state = manager.get_game_state("t1", None).expect("state");
    assert_eq!(state.player("d").map(|p| p.seat), Some(1));
    assert_eq!(state.phase, Phase::WaitingForPlayers);
}

#[test]
fn actions_route_to_the_table() {
    let (manager, _) = setup();
    manager.create_game("t1", "Main", &seeded()).expect("create");
    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");

    assert_eq!(
        manager.process_action("t1", "bob", PlayerAction::Check),
        Err(LobbyError::Game(GameError::NotPlayersTurn {
            expected: "alice".to_string(),
            actual: "bob".to_string()
        }))
    );
    assert_eq!(
        manager.process_action("zz", "bob", PlayerAction::Check),
        Err(LobbyError::GameNotFound("zz".to_string()))
    );

    manager
        .process_action("t1", "alice", PlayerAction::Call)
        .expect("call");
    manager
        .process_action("t1", "bob", PlayerAction::Check)
        .expect("check");
    let state = manager.get_game_state("t1", None).expect("state");
    assert_eq!(state.phase, Phase::Flop);
    assert_eq!(state.pot, 200);
}

#[test]
fn next_hand_can_be_started_without_a_runtime() {
    let (manager, sink) = setup();
    manager.create_game("t1", "Main", &seeded()).expect("create");
    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");

    let summary = manager
        .process_action("t1", "alice", PlayerAction::Fold)
        .expect("fold")
        .expect("hand over");
    assert_eq!(summary.hand_number, 1);
    assert_eq!(sink.finished_hands(), 1);
    assert_eq!(manager.scheduler().pending_count(), 0);

    assert_eq!(manager.start_next_hand("t1", 0), Ok(false));
    assert_eq!(manager.start_next_hand("t1", 1), Ok(true));
    assert_eq!(manager.start_next_hand("t1", 1), Ok(false));
    let state = manager.get_game_state("t1", None).expect("state");
    assert_eq!(state.hand_number, 2);
    assert_eq!(state.dealer.as_deref(), Some("bob"));
}

#[test]
fn leaving_mid_hand_unlinks_after_settlement() {
    let (manager, sink) = setup();
    manager.create_game("t1", "Main", &seeded()).expect("create");
    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");

    // alice is to act, so leaving folds her hand; her stack rides on the summary
    assert_eq!(manager.leave_game("t1", "alice"), Ok(None));
    assert!(manager.tables_for("alice").is_empty());
    assert_eq!(sink.finished_hands(), 1);

    let state = manager.get_game_state("t1", None).expect("state");
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.players.len(), 1);

    assert_eq!(manager.leave_game("t1", "bob"), Ok(Some(10_050)));
    assert_eq!(manager.game_count(), 0);
    assert_eq!(sink.closed(), vec![("t1".to_string(), "empty".to_string())]);
    let summary = sink.last_summary().expect("hand finished");
    assert_eq!(summary.cash_out_for("alice"), Some(9_950));
}

#[test]
fn leaving_requires_a_seat() {
    let (manager, _) = setup();
    manager.create_game("t1", "Main", &seeded()).expect("create");
    assert_eq!(
        manager.leave_game("t1", "ghost"),
        Err(LobbyError::Game(GameError::PlayerNotInGame(
            "ghost".to_string()
        )))
    );
    assert_eq!(
        manager.leave_game("t9", "ghost"),
        Err(LobbyError::GameNotFound("t9".to_string()))
    );
}

#[test]
fn listing_is_sorted_by_id() {
    let (manager, _) = setup();
    for id in ["charlie", "alpha", "bravo"] {
        manager.create_game(id, id, &seeded()).expect("create");
    }
    manager.join_game("bravo", "p", "p", 5_000).expect("join");

    let tables = manager.list_games();
    let ids: Vec<&str> = tables.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    assert_eq!(tables[1].player_count, 1);
    assert_eq!(tables[0].big_blind, 100);
}

#[test]
fn cleanup_removes_only_idle_empty_tables() {
    let (manager, sink) = setup();
    manager.create_game("idle", "Idle", &seeded()).expect("create");
    manager.create_game("busy", "Busy", &seeded()).expect("create");
    manager.join_game("busy", "p", "p", 5_000).expect("join");

    assert!(manager.cleanup_inactive_games().is_empty());

    let later = Utc::now() + chrono::Duration::hours(2);
    assert_eq!(manager.cleanup_inactive_games_at(later), vec!["idle".to_string()]);
    assert_eq!(manager.game_count(), 1);
    assert!(manager.get_game("busy").is_ok());
    assert_eq!(sink.closed(), vec![("idle".to_string(), "inactive".to_string())]);
}

#[test]
fn table_lifecycle_is_logged() {
    let capture = LogCapture::new();
    capture.scoped(|| {
        let (manager, _) = setup();
        manager.create_game("t1", "Main", &seeded()).expect("create");
        manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
        manager.join_game("t1", "bob", "Bob", 10_000).expect("join");
        manager.leave_game("t1", "alice").expect("leave");
    });

    let created = capture.matching("table created");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].field("name"), Some("Main"));
    assert_eq!(created[0].target, "felt_lobby::manager");

    let joined = capture.matching("player joined table");
    assert_eq!(joined.len(), 2);
    assert_eq!(joined[1].field("seat"), Some("1"));
    assert_eq!(capture.matching("player disconnected mid-hand").len(), 1);
    assert_eq!(capture.matching("hand started").len(), 1);
}
