//! # felt_lobby: table registry for felt-engine
//!
//! Runs many [`felt_engine::game::Game`] tables side by side: creates and
//! lists tables, seats players within lobby-wide limits, routes actions,
//! deals the next hand after a short pause and closes tables that sit empty.
//! Observers hear about every change through an [`EventSink`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use felt_engine::config::GameOptions;
//! use felt_lobby::{EventBus, LobbySettings, TableManager};
//!
//! # async fn run() -> Result<(), felt_lobby::LobbyError> {
//! let bus = EventBus::new();
//! let manager = TableManager::new(LobbySettings::default(), Arc::new(bus.clone()))?;
//! let mut updates = bus.subscribe("main");
//!
//! manager.create_game("main", "Main Table", &GameOptions::new().with_blinds(25, 50))?;
//! manager.join_game("main", "alice", "Alice", 5_000)?;
//! manager.join_game("main", "bob", "Bob", 5_000)?;
//!
//! while let Some(event) = updates.receiver().recv().await {
//!     println!("{}", serde_json::to_string(&event).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod events;
pub mod logging;
pub mod manager;
pub mod scheduler;
pub mod settings;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, EventSink, EventSubscription, TableEvent};
pub use logging::{init_json_logging, init_logging, LogCapture, LogEntry};
pub use manager::{GameId, LobbyError, SharedGame, TableManager};
pub use scheduler::HandScheduler;
pub use settings::{LobbySettings, SettingsError};
