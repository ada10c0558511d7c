use std::time::Duration;

use felt_engine::config::GameConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{ErrorSeverity, IntoErrorResponse};

/// Lobby-wide settings shared by every table the manager runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbySettings {
    /// Tables one player may sit at concurrently (default 3)
    pub max_tables_per_player: usize,
    /// Pause between a settled hand and the next deal (default 5 s)
    pub next_hand_delay: Duration,
    /// Empty tables idle longer than this are removed (default 1 h)
    pub idle_timeout: Duration,
    /// How often the cleanup task runs (default 5 min)
    pub cleanup_interval: Duration,
    /// Base configuration that per-table options are merged onto
    pub default_game: GameConfig,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            max_tables_per_player: 3,
            next_hand_delay: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(5 * 60),
            default_game: GameConfig::default(),
        }
    }
}

impl LobbySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_tables_per_player == 0 {
            return Err(SettingsError::InvalidValue(
                "max_tables_per_player must be greater than 0".to_string(),
            ));
        }

        if self.idle_timeout.is_zero() {
            return Err(SettingsError::InvalidValue(
                "idle_timeout must be greater than 0".to_string(),
            ));
        }

        if self.cleanup_interval.is_zero() {
            return Err(SettingsError::InvalidValue(
                "cleanup_interval must be greater than 0".to_string(),
            ));
        }

        self.default_game
            .validate()
            .map_err(|err| SettingsError::InvalidValue(format!("default_game: {err}")))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

impl IntoErrorResponse for SettingsError {
    fn error_code(&self) -> &'static str {
        "invalid_settings"
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Server
    }
}
