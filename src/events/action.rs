//! # Journal records emitted by the registry.
//!
//! Every mutating [`Registry`](crate::Registry) call that affects at least one
//! task produces one [`Action`] per operation it performs: an [`ActionKind`]
//! and the full list of affected tasks.
//!
//! ## Ordering guarantees
//! Each action has a globally unique sequence number (`seq`) that increases
//! monotonically. For a single caller, actions are emitted in call order.
//!
//! ## Example
//! ```text
//! include(a)            → Include [a]
//! raise(&[])            → Raise   [a, b]
//! take(&a, true)        → Land    [a], Exclude [a]
//! exclude(false, &["b"]) → Exclude [b]
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::ManagedTask;

/// Global sequence counter for action ordering.
static ACTION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Kind of registry operation recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Tasks were added to the registry.
    Include,
    /// Tasks were removed from the registry.
    Exclude,
    /// Tasks were stopped.
    Land,
    /// Tasks were started.
    Raise,
}

impl ActionKind {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionKind::Include => "include",
            ActionKind::Exclude => "exclude",
            ActionKind::Land => "land",
            ActionKind::Raise => "raise",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One journaled registry operation and the tasks it affected.
#[derive(Clone, Debug)]
pub struct Action {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Operation kind.
    pub kind: ActionKind,
    /// Affected tasks, never empty.
    pub tasks: Vec<Arc<ManagedTask>>,
}

impl Action {
    /// Creates an action with the current timestamp and next sequence number.
    pub fn new(kind: ActionKind, tasks: Vec<Arc<ManagedTask>>) -> Self {
        Self {
            seq: ACTION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            tasks,
        }
    }

    /// Names of the affected tasks, in action order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Whether `task` is among the affected tasks (by identity).
    pub fn contains(&self, task: &ManagedTask) -> bool {
        self.tasks.iter().any(|t| t.id() == task.id())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} {:?}", self.seq, self.kind, self.names())
    }
}
