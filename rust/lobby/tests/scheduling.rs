use std::sync::Arc;
use std::time::Duration;

use felt_engine::config::GameOptions;
use felt_engine::game::Phase;
use felt_engine::player::PlayerAction;
use felt_lobby::{EventBus, LobbySettings, TableEvent, TableManager};

fn manager(bus: &EventBus, settings: LobbySettings) -> TableManager {
    TableManager::new(settings, Arc::new(bus.clone())).expect("manager")
}

fn heads_up(manager: &TableManager) {
    manager
        .create_game("t1", "Main", &GameOptions::new().with_seed(5))
        .expect("create");
    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");
}

fn hand_number(manager: &TableManager) -> u64 {
    manager.get_game_state("t1", None).expect("state").hand_number
}

#[tokio::test(start_paused = true)]
async fn next_hand_is_dealt_after_the_delay() {
    let bus = EventBus::new();
    let manager = manager(&bus, LobbySettings::default());
    heads_up(&manager);

    manager
        .process_action("t1", "alice", PlayerAction::Fold)
        .expect("fold");
    assert_eq!(manager.scheduler().pending_for("t1"), Some(1));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(hand_number(&manager), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(hand_number(&manager), 2);
    let state = manager.get_game_state("t1", None).expect("state");
    assert_eq!(state.phase, Phase::PreFlop);
    assert_eq!(manager.scheduler().pending_for("t1"), None);
}

#[tokio::test(start_paused = true)]
async fn manual_start_makes_the_timer_a_no_op() {
    let bus = EventBus::new();
    let manager = manager(&bus, LobbySettings::default());
    heads_up(&manager);
    manager
        .process_action("t1", "alice", PlayerAction::Fold)
        .expect("fold");

    assert_eq!(manager.start_next_hand("t1", 1), Ok(true));
    tokio::time::sleep(Duration::from_secs(10)).await;
    // the stale timer must not deal a third hand
    assert_eq!(hand_number(&manager), 2);
}

#[tokio::test(start_paused = true)]
async fn closing_a_table_cancels_its_timer() {
    let bus = EventBus::new();
    let manager = manager(&bus, LobbySettings::default());
    heads_up(&manager);
    manager
        .process_action("t1", "alice", PlayerAction::Fold)
        .expect("fold");

    manager.leave_game("t1", "alice").expect("leave");
    // one player left: the table is over and no hand is pending
    assert_eq!(manager.scheduler().pending_for("t1"), None);
    manager.leave_game("t1", "bob").expect("leave");
    assert_eq!(manager.game_count(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(manager.game_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_state_and_hand_results() {
    let bus = EventBus::new();
    let manager = manager(&bus, LobbySettings::default());
    manager
        .create_game("t1", "Main", &GameOptions::new().with_seed(5))
        .expect("create");
    let mut sub = bus.subscribe("t1");

    manager.join_game("t1", "alice", "Alice", 10_000).expect("join");
    manager.join_game("t1", "bob", "Bob", 10_000).expect("join");
    manager
        .process_action("t1", "alice", PlayerAction::Fold)
        .expect("fold");

    let mut kinds = Vec::new();
    while let Ok(event) = sub.receiver.try_recv() {
        kinds.push(match event {
            TableEvent::StateChanged { snapshot, .. } => {
                // public view never leaks hole cards mid-hand
                if snapshot.phase == Phase::PreFlop {
                    assert!(snapshot.players.iter().all(|p| p.hole_cards.is_none()));
                }
                "state"
            }
            TableEvent::HandFinished { summary } => {
                assert_eq!(summary.winners(), vec![&"bob".to_string()]);
                "hand"
            }
            TableEvent::TableClosed { .. } => "closed",
        });
    }
    assert_eq!(kinds, vec!["state", "state", "state", "hand"]);
}

#[tokio::test(start_paused = true)]
async fn cleanup_task_removes_idle_tables() {
    let bus = EventBus::new();
    let settings = LobbySettings {
        idle_timeout: Duration::from_millis(1),
        cleanup_interval: Duration::from_secs(60),
        ..Default::default()
    };
    let manager = manager(&bus, settings);
    manager
        .create_game("idle", "Idle", &GameOptions::new())
        .expect("create");
    let task = manager.spawn_cleanup().expect("runtime present");

    // idleness is measured on the wall clock
    std::thread::sleep(Duration::from_millis(5));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(manager.game_count(), 0);
    task.abort();
}
