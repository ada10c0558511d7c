//! Subscriber setup for processes embedding the lobby, plus an in-memory
//! capture so tests can assert on what tables logged.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,felt_lobby=debug,felt_engine=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a human-readable fmt subscriber as the global default.
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// One JSON object per line, for log shippers.
pub fn init_json_logging() -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Collects every event seen while it is the active subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with this capture as the current thread's subscriber.
    pub fn scoped<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = Registry::default().with(self.layer());
        tracing::subscriber::with_default(subscriber, f)
    }

    /// A layer feeding this capture, for stacking onto another subscriber.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer {
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries whose message contains `text`
    pub fn matching(&self, text: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.message.contains(text))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

pub struct CaptureLayer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        let metadata = event.metadata();
        let entry = LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: fields.message,
            fields: fields.values,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

#[derive(Default)]
struct EventFields {
    message: String,
    values: Vec<(String, String)>,
}

impl EventFields {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.values.push((field.name().to_string(), value));
        }
    }
}

impl Visit for EventFields {
    // plain strings without Debug quoting
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}
