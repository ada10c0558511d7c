//! Deferred next-hand starts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

#[derive(Debug)]
struct Pending {
    hand_number: u64,
    handle: AbortHandle,
}

/// One cancellable timer per table, keyed by the hand it follows.
///
/// The timer only decides *when* to fire. Whether the start is still wanted
/// is checked by the table itself (`Game::start_scheduled_hand`), so a timer
/// that outlives its hand is harmless.
#[derive(Debug, Clone)]
pub struct HandScheduler {
    delay: Duration,
    pending: Arc<Mutex<HashMap<String, Pending>>>,
}

impl HandScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `start` after the delay unless cancelled or replaced first.
    ///
    /// A table has at most one timer: scheduling a different hand number
    /// aborts the previous one, scheduling the same one again is a no-op.
    /// Returns `false` when there is no tokio runtime to run the timer on;
    /// the caller then has to start the hand itself.
    pub fn schedule<F>(&self, game_id: &str, hand_number: u64, start: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                game_id = %game_id,
                hand_number,
                "no async runtime, next hand must be started manually"
            );
            return false;
        };

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = pending.get(game_id) {
            if existing.hand_number == hand_number {
                return true;
            }
            existing.handle.abort();
        }

        let delay = self.delay;
        let key = game_id.to_string();
        let registry = Arc::clone(&self.pending);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = registry.lock().unwrap_or_else(PoisonError::into_inner);
                if pending.get(&key).map(|p| p.hand_number) == Some(hand_number) {
                    pending.remove(&key);
                }
            }
            start();
        });

        tracing::debug!(
            game_id = %game_id,
            after_hand = hand_number,
            delay_ms = delay.as_millis() as u64,
            "next hand scheduled"
        );
        pending.insert(
            game_id.to_string(),
            Pending {
                hand_number,
                handle: task.abort_handle(),
            },
        );
        true
    }

    /// Aborts the table's timer, if any.
    pub fn cancel(&self, game_id: &str) -> bool {
        let removed = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(game_id);
        match removed {
            Some(p) => {
                p.handle.abort();
                tracing::debug!(game_id = %game_id, after_hand = p.hand_number, "next hand cancelled");
                true
            }
            None => false,
        }
    }

    /// The hand number the table's pending timer follows.
    pub fn pending_for(&self, game_id: &str) -> Option<u64> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(game_id)
            .map(|p| p.hand_number)
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
