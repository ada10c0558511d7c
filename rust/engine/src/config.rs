use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Seats a table may have: 2 hole cards each, 5 board cards and 3 burns
/// must fit in 52 cards.
pub const MAX_SEATS: usize = 22;

/// Per-table configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    /// Small blind (default 50)
    pub small_blind: u64,
    /// Big blind, also the minimum raise increment (default 100)
    pub big_blind: u64,
    /// Suggested buy-in shown in listings (default 10 000)
    pub default_buy_in: u64,
    /// Smallest accepted buy-in (default 2 000)
    pub min_buy_in: u64,
    /// Largest accepted buy-in (default 50 000)
    pub max_buy_in: u64,
    /// Seated players needed to deal; below it the table ends (default 2)
    pub min_players: usize,
    /// Number of seats (default 10)
    pub max_players: usize,
    /// Advisory deadline for a whole turn (default 30 s)
    pub turn_timeout: Duration,
    /// Advisory deadline for a single decision (default 15 s)
    pub decision_timeout: Duration,
    /// Deck seed; `None` draws one at table creation
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            small_blind: 50,
            big_blind: 100,
            default_buy_in: 10_000,
            min_buy_in: 2_000,
            max_buy_in: 50_000,
            min_players: 2,
            max_players: 10,
            turn_timeout: Duration::from_secs(30),
            decision_timeout: Duration::from_secs(15),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(GameError::InvalidConfig("blinds must be positive".into()));
        }
        if self.small_blind > self.big_blind {
            return Err(GameError::InvalidConfig(
                "small blind cannot exceed big blind".into(),
            ));
        }
        if self.min_buy_in == 0 {
            return Err(GameError::InvalidConfig(
                "min buy-in must be positive".into(),
            ));
        }
        if self.min_buy_in > self.max_buy_in {
            return Err(GameError::InvalidConfig(
                "min buy-in cannot exceed max buy-in".into(),
            ));
        }
        if self.default_buy_in < self.min_buy_in || self.default_buy_in > self.max_buy_in {
            return Err(GameError::InvalidConfig(
                "default buy-in must lie within the buy-in bounds".into(),
            ));
        }
        if self.min_players < 2 {
            return Err(GameError::InvalidConfig(
                "a table needs at least 2 players".into(),
            ));
        }
        if self.min_players > self.max_players {
            return Err(GameError::InvalidConfig(
                "min players cannot exceed max players".into(),
            ));
        }
        if self.max_players > MAX_SEATS {
            return Err(GameError::InvalidConfig(format!(
                "at most {MAX_SEATS} seats fit a 52-card deck"
            )));
        }
        Ok(())
    }

    /// This config with every override in `options` applied.
    pub fn merged(&self, options: &GameOptions) -> GameConfig {
        let mut config = self.clone();
        if let Some((small, big)) = options.blinds {
            config.small_blind = small;
            config.big_blind = big;
        }
        if let Some((default, min, max)) = options.buy_in {
            config.default_buy_in = default;
            config.min_buy_in = min;
            config.max_buy_in = max;
        }
        if let Some((min, max)) = options.player_limits {
            config.min_players = min;
            config.max_players = max;
        }
        if let Some((turn, decision)) = options.timeouts {
            config.turn_timeout = turn;
            config.decision_timeout = decision;
        }
        if options.seed.is_some() {
            config.seed = options.seed;
        }
        config
    }
}

/// Overrides applied on top of a base [`GameConfig`] when a table is created.
///
/// ```
/// use felt_engine::config::{GameConfig, GameOptions};
///
/// let config = GameConfig::default().merged(&GameOptions::new().with_blinds(25, 50));
/// assert_eq!(config.big_blind, 50);
/// assert_eq!(config.max_players, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameOptions {
    pub blinds: Option<(u64, u64)>,
    pub buy_in: Option<(u64, u64, u64)>,
    pub player_limits: Option<(usize, usize)>,
    pub timeouts: Option<(Duration, Duration)>,
    pub seed: Option<u64>,
}

impl GameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blinds(mut self, small_blind: u64, big_blind: u64) -> Self {
        self.blinds = Some((small_blind, big_blind));
        self
    }

    pub fn with_buy_in(mut self, default_buy_in: u64, min_buy_in: u64, max_buy_in: u64) -> Self {
        self.buy_in = Some((default_buy_in, min_buy_in, max_buy_in));
        self
    }

    pub fn with_player_limits(mut self, min_players: usize, max_players: usize) -> Self {
        self.player_limits = Some((min_players, max_players));
        self
    }

    pub fn with_timeouts(mut self, turn_timeout: Duration, decision_timeout: Duration) -> Self {
        self.timeouts = Some((turn_timeout, decision_timeout));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
