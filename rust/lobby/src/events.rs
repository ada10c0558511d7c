use felt_engine::history::HandSummary;
use felt_engine::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

// Bounded so a stalled subscriber cannot grow memory; when full the
// subscriber is dropped instead of blocking the table.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<TableEvent>;
pub type EventReceiver = mpsc::Receiver<TableEvent>;

/// What the lobby tells observers after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// Public (spectator) view after a change
    StateChanged {
        game_id: String,
        snapshot: Box<GameSnapshot>,
    },
    HandFinished {
        summary: Box<HandSummary>,
    },
    TableClosed {
        game_id: String,
        reason: String,
    },
}

impl TableEvent {
    pub fn game_id(&self) -> &str {
        match self {
            TableEvent::StateChanged { game_id, .. } => game_id,
            TableEvent::HandFinished { summary } => &summary.game_id,
            TableEvent::TableClosed { game_id, .. } => game_id,
        }
    }
}

/// Receives table events once every lock has been released.
///
/// Delivery (WebSocket, SSE, polling, storage) is the implementor's concern;
/// `publish` must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: TableEvent);
}

pub struct EventSubscription {
    bus: EventBus,
    game_id: String,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.game_id, self.subscriber_id);
    }
}

/// In-process fan-out of table events to per-table subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<String, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, game_id: impl Into<String>) -> EventSubscription {
        let game_id = game_id.into();
        let (subscriber_id, receiver) = self.subscribe_raw(game_id.clone());
        EventSubscription {
            bus: self.clone(),
            game_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, game_id: String) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.entry(game_id.clone()).or_default().push((id, tx));

        tracing::info!(
            game_id = %game_id,
            subscriber_id = id,
            "subscribed to table events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, game_id: &str, event: TableEvent) {
        tracing::debug!(
            game_id = %game_id,
            event_type = event_type(&event),
            "broadcasting table event"
        );

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get(game_id).cloned()
        };

        let Some(list) = subscribers else {
            tracing::trace!(game_id = %game_id, "no subscribers for table");
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    game_id = %game_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping table event subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(game_id, &failed);
        }
    }

    pub fn unsubscribe(&self, game_id: &str, subscriber_id: usize) {
        self.remove_subscribers(game_id, &[subscriber_id]);
    }

    pub fn drop_game(&self, game_id: &str) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(game_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, game_id: &str, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.get_mut(game_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(game_id);
            }
        }
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: TableEvent) {
        let game_id = event.game_id().to_string();
        let closing = matches!(event, TableEvent::TableClosed { .. });
        self.broadcast(&game_id, event);
        if closing {
            self.drop_game(&game_id);
        }
    }
}

fn event_type(event: &TableEvent) -> &'static str {
    match event {
        TableEvent::StateChanged { .. } => "state_changed",
        TableEvent::HandFinished { .. } => "hand_finished",
        TableEvent::TableClosed { .. } => "table_closed",
    }
}
