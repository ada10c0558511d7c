use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use chrono::{DateTime, Utc};
use felt_engine::config::GameOptions;
use felt_engine::errors::GameError;
use felt_engine::game::{Game, Phase};
use felt_engine::history::HandSummary;
use felt_engine::player::{Player, PlayerAction, PlayerId};
use felt_engine::snapshot::{GameSnapshot, TableSummary};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::events::{EventSink, TableEvent};
use crate::scheduler::HandScheduler;
use crate::settings::LobbySettings;

pub type GameId = String;
pub type SharedGame = Arc<Mutex<Game>>;

/// Registry of live tables.
///
/// Cloning is cheap and every clone drives the same registry. Each table sits
/// behind its own mutex, held for one whole engine call; the registry lock is
/// always taken before a table lock, never the other way round. Events go to
/// the sink only after both are released.
#[derive(Clone)]
pub struct TableManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    settings: LobbySettings,
    registry: RwLock<Registry>,
    sink: Arc<dyn EventSink>,
    scheduler: HandScheduler,
}

#[derive(Default)]
struct Registry {
    games: HashMap<GameId, SharedGame>,
    /// player -> tables they are seated at, in join order
    players: HashMap<PlayerId, Vec<GameId>>,
}

impl Registry {
    fn unlink(&mut self, player_id: &str, game_id: &str) {
        if let Some(tables) = self.players.get_mut(player_id) {
            tables.retain(|id| id != game_id);
            if tables.is_empty() {
                self.players.remove(player_id);
            }
        }
    }

    fn drop_game(&mut self, game_id: &str) -> Option<SharedGame> {
        for tables in self.players.values_mut() {
            tables.retain(|id| id != game_id);
        }
        self.players.retain(|_, tables| !tables.is_empty());
        self.games.remove(game_id)
    }
}

/// What a table looked like right after a mutation, read under its lock.
struct Outcome {
    snapshot: GameSnapshot,
    summary: Option<HandSummary>,
    awaiting: Option<u64>,
    phase: Phase,
    empty: bool,
}

impl Outcome {
    fn capture(game: &Game, summary: Option<HandSummary>) -> Self {
        Self {
            snapshot: game.snapshot(None),
            summary,
            awaiting: game.awaiting_next_hand(),
            phase: game.phase(),
            empty: game.is_empty(),
        }
    }
}

impl std::fmt::Debug for TableManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableManager")
            .field("settings", &self.inner.settings)
            .field("tables", &self.game_count())
            .finish()
    }
}

impl TableManager {
    pub fn new(settings: LobbySettings, sink: Arc<dyn EventSink>) -> Result<Self, LobbyError> {
        settings
            .validate()
            .map_err(|err| LobbyError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            inner: Arc::new(ManagerInner {
                scheduler: HandScheduler::new(settings.next_hand_delay),
                settings,
                registry: RwLock::new(Registry::default()),
                sink,
            }),
        })
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.inner.settings
    }

    pub fn scheduler(&self) -> &HandScheduler {
        &self.inner.scheduler
    }

    /// Opens a table configured from the lobby default merged with `options`.
    pub fn create_game(
        &self,
        game_id: &str,
        name: &str,
        options: &GameOptions,
    ) -> Result<TableSummary, LobbyError> {
        let config = self.inner.settings.default_game.merged(options);
        let game = Game::new(game_id, name, config).map_err(|err| match err {
            GameError::InvalidConfig(msg) => LobbyError::InvalidConfig(msg),
            other => LobbyError::Game(other),
        })?;
        let summary = game.summary();
        let snapshot = game.snapshot(None);

        {
            let mut registry = self.write_registry()?;
            if registry.games.contains_key(game_id) {
                return Err(LobbyError::GameAlreadyExists(game_id.to_string()));
            }
            registry
                .games
                .insert(game_id.to_string(), Arc::new(Mutex::new(game)));
        }

        tracing::info!(
            game_id = %game_id,
            name = %name,
            small_blind = summary.small_blind,
            big_blind = summary.big_blind,
            max_players = summary.max_players,
            "table created"
        );
        self.inner.sink.publish(TableEvent::StateChanged {
            game_id: game_id.to_string(),
            snapshot: Box::new(snapshot),
        });
        Ok(summary)
    }

    /// Seats a player at the lowest free seat.
    pub fn join_game(
        &self,
        game_id: &str,
        player_id: &str,
        username: &str,
        buy_in: u64,
    ) -> Result<(), LobbyError> {
        let outcome = {
            let mut registry = self.write_registry()?;
            let shared = registry
                .games
                .get(game_id)
                .cloned()
                .ok_or_else(|| LobbyError::GameNotFound(game_id.to_string()))?;

            let tables = registry.players.get(player_id).map(Vec::as_slice).unwrap_or(&[]);
            if tables.iter().any(|id| id == game_id) {
                return Err(GameError::PlayerAlreadyInGame(player_id.to_string()).into());
            }
            let limit = self.inner.settings.max_tables_per_player;
            if tables.len() >= limit {
                return Err(LobbyError::TooManyTables {
                    player: player_id.to_string(),
                    limit,
                });
            }

            let mut game = lock_game(&shared)?;
            let config = game.config();
            if buy_in < config.min_buy_in || buy_in > config.max_buy_in {
                return Err(LobbyError::InvalidBuyIn {
                    amount: buy_in,
                    min: config.min_buy_in,
                    max: config.max_buy_in,
                });
            }
            let max_players = config.max_players;
            let occupied = game.occupied_seats();
            let seat = (0..max_players)
                .find(|seat| !occupied.contains(seat))
                .ok_or(GameError::GameFull { max_players })?;

            let result = game.add_player(Player::new(player_id, username, buy_in, seat));
            let summary = match result {
                Ok(summary) => summary,
                Err(GameError::HandAborted(err)) if game.has_player(player_id) => {
                    // seated, but the first deal failed
                    registry
                        .players
                        .entry(player_id.to_string())
                        .or_default()
                        .push(game_id.to_string());
                    let outcome = Outcome::capture(&game, None);
                    drop(game);
                    drop(registry);
                    self.settle_outcome(game_id, outcome);
                    return Err(GameError::HandAborted(err).into());
                }
                Err(err) => return Err(err.into()),
            };
            registry
                .players
                .entry(player_id.to_string())
                .or_default()
                .push(game_id.to_string());

            tracing::info!(
                game_id = %game_id,
                player_id = %player_id,
                seat,
                buy_in,
                "player joined table"
            );
            Outcome::capture(&game, summary)
        };

        self.settle_outcome(game_id, outcome);
        Ok(())
    }

    /// Takes a player off a table; an emptied table is closed.
    ///
    /// Returns the stack when the seat was freed straight away. A player who
    /// leaves during a hand is paid out when it settles, through the
    /// summary's `cash_outs`, and this returns `None`.
    pub fn leave_game(&self, game_id: &str, player_id: &str) -> Result<Option<u64>, LobbyError> {
        let (outcome, closed, cashed) = {
            let mut registry = self.write_registry()?;
            let shared = registry
                .games
                .get(game_id)
                .cloned()
                .ok_or_else(|| LobbyError::GameNotFound(game_id.to_string()))?;

            let mut game = lock_game(&shared)?;
            let stack = game.player(player_id).map(Player::chips);
            let summary = game.remove_player(player_id)?;
            let settled = summary
                .as_ref()
                .is_some_and(|s| s.cash_out_for(player_id).is_some());
            let cashed = if game.has_player(player_id) || settled {
                None
            } else {
                stack
            };
            if !game.has_player(player_id) {
                registry.unlink(player_id, game_id);
            }
            let outcome = Outcome::capture(&game, summary);
            drop(game);

            let closed = outcome.empty && registry.drop_game(game_id).is_some();
            (outcome, closed, cashed)
        };

        tracing::info!(
            game_id = %game_id,
            player_id = %player_id,
            cashed_out = ?cashed,
            "player left table"
        );
        if closed {
            self.close_table(game_id, "empty", outcome.summary);
        } else {
            self.settle_outcome(game_id, outcome);
        }
        Ok(cashed)
    }

    pub fn process_action(
        &self,
        game_id: &str,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<Option<HandSummary>, LobbyError> {
        let shared = self.get_game(game_id)?;
        let (result, outcome) = {
            let mut game = lock_game(&shared)?;
            match game.process_action(player_id, action) {
                Ok(summary) => (Ok(summary.clone()), Outcome::capture(&game, summary)),
                // the hand was voided: stacks were refunded, observers need to know
                Err(err @ GameError::HandAborted(_)) => (Err(err), Outcome::capture(&game, None)),
                Err(err) => return Err(err.into()),
            }
        };
        self.settle_outcome(game_id, outcome);
        result.map_err(LobbyError::from)
    }

    /// Viewer-scoped snapshot; `None` gives the public view.
    pub fn get_game_state(
        &self,
        game_id: &str,
        viewer: Option<&str>,
    ) -> Result<GameSnapshot, LobbyError> {
        let shared = self.get_game(game_id)?;
        let game = lock_game(&shared)?;
        Ok(game.snapshot(viewer))
    }

    /// Public listing, sorted by table id.
    pub fn list_games(&self) -> Vec<TableSummary> {
        let tables: Vec<SharedGame> = match self.inner.registry.read() {
            Ok(registry) => registry.games.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        let mut summaries: Vec<TableSummary> = tables
            .iter()
            .filter_map(|shared| lock_game(shared).ok().map(|game| game.summary()))
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub fn get_game(&self, game_id: &str) -> Result<SharedGame, LobbyError> {
        let registry = self
            .inner
            .registry
            .read()
            .map_err(|_| LobbyError::StoragePoisoned)?;
        registry
            .games
            .get(game_id)
            .cloned()
            .ok_or_else(|| LobbyError::GameNotFound(game_id.to_string()))
    }

    /// Tables the player is seated at, in join order.
    pub fn tables_for(&self, player_id: &str) -> Vec<GameId> {
        match self.inner.registry.read() {
            Ok(registry) => registry.players.get(player_id).cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    pub fn game_count(&self) -> usize {
        match self.inner.registry.read() {
            Ok(registry) => registry.games.len(),
            Err(_) => 0,
        }
    }

    /// Deals the hand following `hand_number`, if the table is still waiting
    /// for it. Returns whether a new hand was dealt; a table that ends
    /// instead still publishes its final state.
    pub fn start_next_hand(&self, game_id: &str, hand_number: u64) -> Result<bool, LobbyError> {
        let shared = self.get_game(game_id)?;
        let (started, changed, result, outcome) = {
            let mut game = lock_game(&shared)?;
            let (hand_before, phase_before) = (game.hand_number(), game.phase());
            let result = game.start_scheduled_hand(hand_number);
            let started = game.hand_number() != hand_before;
            // a table that ran out of players ends without dealing
            let changed = started || game.phase() != phase_before;
            let summary = result.as_ref().ok().cloned().flatten();
            (started, changed, result, Outcome::capture(&game, summary))
        };
        if changed {
            self.settle_outcome(game_id, outcome);
        }
        result?;
        Ok(started)
    }

    pub fn cleanup_inactive_games(&self) -> Vec<GameId> {
        self.cleanup_inactive_games_at(Utc::now())
    }

    /// Removes empty tables whose last activity is older than the idle
    /// timeout, measured from `now`.
    pub fn cleanup_inactive_games_at(&self, now: DateTime<Utc>) -> Vec<GameId> {
        let idle = self.inner.settings.idle_timeout;
        let mut removed = Vec::new();
        {
            let mut registry = match self.inner.registry.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let stale: Vec<GameId> = registry
                .games
                .iter()
                .filter(|(_, shared)| {
                    lock_game(shared).is_ok_and(|game| {
                        game.is_empty()
                            && now
                                .signed_duration_since(game.last_activity())
                                .to_std()
                                .is_ok_and(|elapsed| elapsed >= idle)
                    })
                })
                .map(|(id, _)| id.clone())
                .collect();
            for id in stale {
                if registry.drop_game(&id).is_some() {
                    removed.push(id);
                }
            }
        }

        for id in &removed {
            tracing::info!(game_id = %id, "removing inactive table");
            self.close_table(id, "inactive", None);
        }
        removed
    }

    /// Runs `cleanup_inactive_games` every cleanup interval until the
    /// manager is dropped. Returns `None` outside a tokio runtime.
    pub fn spawn_cleanup(&self) -> Option<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let weak: Weak<ManagerInner> = Arc::downgrade(&self.inner);
        let period = self.inner.settings.cleanup_interval;
        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let removed = TableManager { inner }.cleanup_inactive_games();
                if !removed.is_empty() {
                    tracing::debug!(removed = removed.len(), "cleanup pass finished");
                }
            }
        }))
    }

    /// Publishes what changed and arranges the next deal. No lock is held.
    fn settle_outcome(&self, game_id: &str, outcome: Outcome) {
        if let Some(summary) = &outcome.summary {
            if !summary.removed_players.is_empty() || outcome.empty {
                self.reconcile(game_id, summary, outcome.empty);
            }
        }

        if outcome.empty && self.get_game(game_id).is_err() {
            self.close_table(game_id, "empty", outcome.summary);
            return;
        }

        self.inner.sink.publish(TableEvent::StateChanged {
            game_id: game_id.to_string(),
            snapshot: Box::new(outcome.snapshot),
        });
        if let Some(summary) = outcome.summary {
            self.inner.sink.publish(TableEvent::HandFinished {
                summary: Box::new(summary),
            });
        }

        match outcome.awaiting {
            Some(hand_number) => self.schedule_next_hand(game_id, hand_number),
            None if outcome.phase == Phase::GameOver => {
                self.inner.scheduler.cancel(game_id);
                tracing::info!(game_id = %game_id, "table finished");
            }
            None => {}
        }
    }

    /// Brings the player index in line with players unseated at settlement.
    fn reconcile(&self, game_id: &str, summary: &HandSummary, empty: bool) {
        let mut registry = match self.inner.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for player_id in &summary.removed_players {
            registry.unlink(player_id, game_id);
        }
        // someone may have sat down since the table was read
        let still_empty = empty
            && registry
                .games
                .get(game_id)
                .is_some_and(|shared| lock_game(shared).is_ok_and(|game| game.is_empty()));
        if still_empty {
            registry.drop_game(game_id);
        }
    }

    fn close_table(&self, game_id: &str, reason: &str, summary: Option<HandSummary>) {
        self.inner.scheduler.cancel(game_id);
        if let Some(summary) = summary {
            self.inner.sink.publish(TableEvent::HandFinished {
                summary: Box::new(summary),
            });
        }
        tracing::info!(game_id = %game_id, reason = %reason, "table closed");
        self.inner.sink.publish(TableEvent::TableClosed {
            game_id: game_id.to_string(),
            reason: reason.to_string(),
        });
    }

    fn schedule_next_hand(&self, game_id: &str, hand_number: u64) {
        let weak = Arc::downgrade(&self.inner);
        let id = game_id.to_string();
        self.inner.scheduler.schedule(game_id, hand_number, move || {
            let Some(inner) = weak.upgrade() else { return };
            let manager = TableManager { inner };
            if let Err(err) = manager.start_next_hand(&id, hand_number) {
                tracing::warn!(
                    game_id = %id,
                    after_hand = hand_number,
                    error = %err,
                    "scheduled hand did not start"
                );
            }
        });
    }

    fn write_registry(&self) -> Result<std::sync::RwLockWriteGuard<'_, Registry>, LobbyError> {
        self.inner
            .registry
            .write()
            .map_err(|_| LobbyError::StoragePoisoned)
    }
}

fn lock_game(shared: &SharedGame) -> Result<MutexGuard<'_, Game>, LobbyError> {
    shared.lock().map_err(|_| LobbyError::StoragePoisoned)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),
    #[error("Game already exists: {0}")]
    GameAlreadyExists(GameId),
    #[error("Player {player} is already at {limit} tables")]
    TooManyTables { player: PlayerId, limit: usize },
    #[error("Buy-in {amount} outside {min}..={max}")]
    InvalidBuyIn { amount: u64, min: u64, max: u64 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Lobby storage poisoned")]
    StoragePoisoned,
}

impl IntoErrorResponse for LobbyError {
    fn error_code(&self) -> &'static str {
        match self {
            LobbyError::GameNotFound(_) => "game_not_found",
            LobbyError::GameAlreadyExists(_) => "game_already_exists",
            LobbyError::TooManyTables { .. } => "too_many_tables",
            LobbyError::InvalidBuyIn { .. } => "invalid_buy_in",
            LobbyError::InvalidConfig(_) => "invalid_config",
            LobbyError::Game(err) => err.error_code(),
            LobbyError::StoragePoisoned => "lobby_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            LobbyError::GameNotFound(id) | LobbyError::GameAlreadyExists(id) => {
                Some(serde_json::json!({ "game_id": id }))
            }
            LobbyError::TooManyTables { player, limit } => Some(serde_json::json!({
                "player_id": player,
                "limit": limit
            })),
            LobbyError::InvalidBuyIn { amount, min, max } => Some(serde_json::json!({
                "amount": amount,
                "min": min,
                "max": max
            })),
            LobbyError::Game(err) => err.error_details(),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            LobbyError::StoragePoisoned => ErrorSeverity::Critical,
            LobbyError::Game(err) => err.severity(),
            _ => ErrorSeverity::Client,
        }
    }
}
