//! # Journal: bounded channel of registry actions.
//!
//! [`Journal`] is a thin wrapper around [`tokio::sync::mpsc`] that the
//! [`Registry`](crate::Registry) emits [`Action`]s into. It is disabled until
//! someone subscribes.
//!
//! ## Architecture
//! ```text
//! Registry call ──► Journal::publish() ──► [bounded queue] ──► subscriber
//!                         │
//!                         ├─ Block      → waits for room (backpressure)
//!                         └─ DropNewest → drops + warn!, returns
//! ```
//!
//! ## Rules
//! - **Single subscriber**: `subscribe()` replaces (and closes) a previous receiver.
//! - **Bounded capacity**: `RegistryConfig::journal_capacity` (min 1).
//! - **Emission is synchronous** with the registry call that caused it.
//! - **Receiver dropped** → journaling switches itself off.
//! - Empty task lists are never published.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::action::{Action, ActionKind};
use crate::config::JournalPolicy;
use crate::tasks::ManagedTask;

/// Optional, bounded output of registry actions.
#[derive(Debug)]
pub struct Journal {
    tx: Mutex<Option<mpsc::Sender<Action>>>,
    capacity: usize,
    policy: JournalPolicy,
}

impl Journal {
    /// Creates a disabled journal; `capacity` is clamped to 1.
    pub fn new(capacity: usize, policy: JournalPolicy) -> Self {
        Self {
            tx: Mutex::new(None),
            capacity: capacity.max(1),
            policy,
        }
    }

    /// Enables emission and returns a fresh receiver.
    ///
    /// The receiver must be drained continuously when the policy is
    /// [`JournalPolicy::Block`].
    pub fn subscribe(&self) -> mpsc::Receiver<Action> {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.sender() = Some(tx);
        rx
    }

    /// Disables emission; the current receiver sees the channel closed.
    pub fn unsubscribe(&self) {
        self.sender().take();
    }

    /// Returns `true` while a subscriber is attached.
    pub fn is_enabled(&self) -> bool {
        self.sender().is_some()
    }

    /// Emits one action for `tasks`, applying the backpressure policy.
    ///
    /// No-op when disabled or when `tasks` is empty.
    pub async fn publish(&self, kind: ActionKind, tasks: &[Arc<ManagedTask>]) {
        if tasks.is_empty() {
            return;
        }
        let Some(tx) = self.sender().clone() else {
            return;
        };

        let action = Action::new(kind, tasks.to_vec());
        let delivered = match self.policy {
            JournalPolicy::Block => tx.send(action).await.is_ok(),
            JournalPolicy::DropNewest => match tx.try_send(action) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(dropped)) => {
                    warn!(
                        kind = %dropped.kind,
                        seq = dropped.seq,
                        count = dropped.tasks.len(),
                        "journal full, action dropped"
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            },
        };

        if !delivered {
            self.detach(&tx);
        }
    }

    /// Switches journaling off if `closed` is still the current sender.
    fn detach(&self, closed: &mpsc::Sender<Action>) {
        let mut current = self.sender();
        if current.as_ref().is_some_and(|tx| tx.same_channel(closed)) {
            debug!("journal receiver dropped, journaling disabled");
            *current = None;
        }
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<Action>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
