//! # Registry: a flock of managed tasks.
//!
//! The registry holds a set of [`ManagedTask`]s keyed by [`TaskId`] and runs
//! bulk lifecycle operations over name-filtered selections of them.
//!
//! ## Architecture
//! ```text
//! include(task) ─────────────► write lock ─► insert ─► Include
//! take(&task, land) ─────────► write lock ─► [stop ─► Land] ─► remove ─► Exclude
//! exclude(land, names) ──────► write lock ─► select ─► [land_all ─► Land] ─► remove all ─► Exclude
//! land(names) ───────────────► read lock  ─► select ─► land_all ─► Land
//! raise(names) ──────────────► read lock  ─► select ─► start each ─► Raise
//! select(names) ─────────────► read lock  ─► select
//! dissolve(land) ────────────► exclude(land, &[])
//!
//! land_all: tokio::spawn(stop(task)) per selected task, then await every handle
//!           (optionally bounded by a semaphore)
//! ```
//!
//! ## Name selection
//! - no names → every member
//! - one name → members with exactly that name
//! - several names → members whose name is in the set (each member at most once)
//!
//! ## Rules
//! - Membership is a set of handles: including a member again is a no-op.
//! - Tasks sharing a name are all selected together.
//! - Each mutating call emits at most one action per kind, listing only the
//!   members it changed; calls changing nothing emit nothing.
//! - `land` and `raise` return the whole selection, but their actions list only
//!   the members that were in the other state beforehand.
//! - Landing survives cancellation of the caller: stops already launched run
//!   to completion in their own tasks.
//! - Actions are emitted while the registry lock is held, so a single
//!   caller's actions follow its call order.
//! - The registry never stops a task unless the caller asks to land it.

use std::collections::{BTreeMap, HashSet};
use std::slice;
use std::sync::Arc;

use tokio::sync::{RwLock, Semaphore, mpsc};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::events::{Action, ActionKind, Journal};
use crate::tasks::{ManagedTask, TaskId};

type Members = BTreeMap<TaskId, Arc<ManagedTask>>;

/// Thread-safe collection of managed tasks with bulk start/stop and an optional journal.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use flockvisor::{ManagedTask, Registry, TaskFn, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let flock = Registry::new();
/// let idle = || TaskFn::arc(|stop: CancellationToken| async move {
///     stop.cancelled().await;
///     Ok::<(), TaskError>(())
/// });
///
/// flock.include(ManagedTask::arc(idle(), Duration::from_secs(1), "x")).await;
/// flock.include(ManagedTask::arc(idle(), Duration::from_secs(1), "y")).await;
///
/// flock.raise(&[]).await;
/// assert!(flock.select(&["x"]).await.iter().all(|t| t.is_flying()));
///
/// let removed = flock.dissolve(true).await;
/// assert_eq!(removed.len(), 2);
/// assert!(removed.iter().all(|t| !t.is_flying()));
/// # }
/// ```
pub struct Registry {
    tasks: RwLock<Members>,
    journal: Journal,
    cfg: RegistryConfig,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry.
    pub fn with_config(cfg: RegistryConfig) -> Self {
        Self {
            tasks: RwLock::new(BTreeMap::new()),
            journal: Journal::new(cfg.journal_capacity_clamped(), cfg.journal_policy),
            cfg,
        }
    }

    /// Returns the configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.cfg
    }

    /// Adds `task`; returns `false` (and emits nothing) if it is already a member.
    pub async fn include(&self, task: Arc<ManagedTask>) -> bool {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id()) {
            return false;
        }
        tasks.insert(task.id(), Arc::clone(&task));
        debug!(task = %task.name(), id = %task.id(), "included");

        self.journal
            .publish(ActionKind::Include, slice::from_ref(&task))
            .await;
        true
    }

    /// Removes `task` if it is a member, optionally landing it first.
    ///
    /// Returns the removed member, or `None` if `task` was not in the registry.
    pub async fn take(&self, task: &ManagedTask, land: bool) -> Option<Arc<ManagedTask>> {
        let mut tasks = self.tasks.write().await;
        let found = tasks.get(&task.id()).cloned()?;
        let affected = slice::from_ref(&found);

        if land {
            let was_flying = found.is_flying();
            found.stop().await;
            if was_flying {
                self.journal.publish(ActionKind::Land, affected).await;
            }
        }
        tasks.remove(&found.id());
        debug!(task = %found.name(), id = %found.id(), land, "taken");

        self.journal.publish(ActionKind::Exclude, affected).await;
        Some(found)
    }

    /// Removes every member selected by `names`, optionally landing them first.
    ///
    /// Returns the removed members.
    pub async fn exclude(&self, land: bool, names: &[&str]) -> Vec<Arc<ManagedTask>> {
        let mut tasks = self.tasks.write().await;
        let matched = select_from(&tasks, names);
        if matched.is_empty() {
            return matched;
        }

        if land {
            let flying = in_state(&matched, true);
            self.land_all(&matched).await;
            self.journal.publish(ActionKind::Land, &flying).await;
        }
        for task in &matched {
            tasks.remove(&task.id());
        }
        debug!(count = matched.len(), land, "excluded");

        self.journal.publish(ActionKind::Exclude, &matched).await;
        matched
    }

    /// Stops every member selected by `names` concurrently and waits for all of them.
    ///
    /// Returns the selected members. If this future is dropped, stops already
    /// launched still complete in the background.
    pub async fn land(&self, names: &[&str]) -> Vec<Arc<ManagedTask>> {
        let tasks = self.tasks.read().await;
        let matched = select_from(&tasks, names);
        let flying = in_state(&matched, true);
        self.land_all(&matched).await;
        debug!(count = matched.len(), changed = flying.len(), "landed");

        self.journal.publish(ActionKind::Land, &flying).await;
        matched
    }

    /// Starts every member selected by `names`, one after another.
    ///
    /// Returns the selected members.
    pub async fn raise(&self, names: &[&str]) -> Vec<Arc<ManagedTask>> {
        let tasks = self.tasks.read().await;
        let matched = select_from(&tasks, names);
        let landed = in_state(&matched, false);
        for task in &matched {
            task.start().await;
        }
        debug!(count = matched.len(), changed = landed.len(), "raised");

        self.journal.publish(ActionKind::Raise, &landed).await;
        matched
    }

    /// Returns the members selected by `names`, oldest first.
    pub async fn select(&self, names: &[&str]) -> Vec<Arc<ManagedTask>> {
        select_from(&*self.tasks.read().await, names)
    }

    /// Removes every member, optionally landing them first.
    pub async fn dissolve(&self, land: bool) -> Vec<Arc<ManagedTask>> {
        self.exclude(land, &[]).await
    }

    /// Returns `true` if `task` is a member.
    pub async fn contains(&self, task: &ManagedTask) -> bool {
        self.tasks.read().await.contains_key(&task.id())
    }

    /// Number of members.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if there are no members.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Enables the journal and returns its receiver.
    ///
    /// `Land` and `Raise` actions list only the members whose state the call
    /// changed, not the whole selection.
    ///
    /// With [`JournalPolicy::Block`](crate::JournalPolicy::Block) the receiver
    /// must be drained continuously: once the queue is full, every mutating
    /// registry call waits for the consumer. A second call replaces (closes)
    /// the previous receiver.
    pub fn journal(&self) -> mpsc::Receiver<Action> {
        self.journal.subscribe()
    }

    /// Disables the journal and closes its receiver.
    pub fn close_journal(&self) {
        self.journal.unsubscribe();
    }

    /// Returns `true` while a journal receiver is attached.
    pub fn is_journaling(&self) -> bool {
        self.journal.is_enabled()
    }

    /// Stops `matched` concurrently, one spawned stop per task.
    ///
    /// The stops are detached tasks, so dropping this future does not abort them.
    async fn land_all(&self, matched: &[Arc<ManagedTask>]) {
        let limit = self.cfg.land_limit().map(|n| Arc::new(Semaphore::new(n)));

        let stops: Vec<_> = matched
            .iter()
            .map(|task| {
                let task = Arc::clone(task);
                let limit = limit.clone();
                tokio::spawn(async move {
                    let _permit = match limit {
                        Some(sem) => sem.acquire_owned().await.ok(),
                        None => None,
                    };
                    task.stop().await;
                })
            })
            .collect();

        for stop in stops {
            if let Err(err) = stop.await {
                warn!(error = %err, "landing ended abnormally");
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Members of `tasks` whose flying state equals `flying`.
fn in_state(tasks: &[Arc<ManagedTask>], flying: bool) -> Vec<Arc<ManagedTask>> {
    tasks
        .iter()
        .filter(|t| t.is_flying() == flying)
        .cloned()
        .collect()
}

fn select_from(tasks: &Members, names: &[&str]) -> Vec<Arc<ManagedTask>> {
    match names {
        [] => tasks.values().cloned().collect(),
        [name] => tasks
            .values()
            .filter(|t| t.name() == *name)
            .cloned()
            .collect(),
        _ => {
            let wanted: HashSet<&str> = names.iter().copied().collect();
            tasks
                .values()
                .filter(|t| wanted.contains(t.name()))
                .cloned()
                .collect()
        }
    }
}
