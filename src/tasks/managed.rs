//! # Managed task: a named task that can be raised and landed many times.
//!
//! A [`ManagedTask`] bundles a [`TaskRef`], a restart interval and a name. It
//! is created **landed** (not running). [`start`](ManagedTask::start) creates a
//! supervision loop ([`supervise_named`]), [`stop`](ManagedTask::stop) stops and
//! discards it. The task may go landed → flying → landed any number of times.
//!
//! ## Rules
//! - At most one live loop per managed task, whatever the interleaving of
//!   concurrent `start`/`stop` calls.
//! - `is_flying()` is `true` exactly while a stop handle is held.
//! - A held handle whose stop was interrupted is treated as landed by the next
//!   `start`, which finishes the stop before launching a new loop.
//! - Transitions are serialized by a per-task guard, independent of any
//!   registry lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::core::{StopHandle, supervise_named};
use crate::tasks::TaskRef;

/// Process-wide counter for task ids.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique handle of a [`ManagedTask`].
///
/// Ids are assigned in creation order, so ordering by id is ordering by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named task with a fixed restart interval, started and stopped on demand.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use flockvisor::{ManagedTask, TaskFn, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bird = ManagedTask::new(
///     TaskFn::arc(|stop: CancellationToken| async move {
///         stop.cancelled().await;
///         Ok::<(), TaskError>(())
///     }),
///     Duration::from_secs(1),
///     "canary",
/// );
/// assert!(!bird.is_flying());
/// bird.start().await;
/// assert!(bird.is_flying());
/// bird.stop().await;
/// assert!(!bird.is_flying());
/// # }
/// ```
pub struct ManagedTask {
    id: TaskId,
    name: Arc<str>,
    interval: Duration,
    task: TaskRef,
    /// Guard of the landed/flying transition; `Some` while flying.
    runner: Mutex<Option<StopHandle>>,
    /// Mirror of `runner.is_some()`, written only under the guard.
    flying: AtomicBool,
}

impl ManagedTask {
    /// Creates a landed task.
    pub fn new(task: TaskRef, interval: Duration, name: impl Into<Arc<str>>) -> Self {
        Self {
            id: TaskId::next(),
            name: name.into(),
            interval,
            task,
            runner: Mutex::new(None),
            flying: AtomicBool::new(false),
        }
    }

    /// Same as [`ManagedTask::new`], wrapped in an `Arc` for a [`Registry`](crate::Registry).
    pub fn arc(task: TaskRef, interval: Duration, name: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Self::new(task, interval, name))
    }

    /// Stable handle of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Task name (not necessarily unique).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delay between the end of one execution and the start of the next.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a supervision loop is currently held.
    pub fn is_flying(&self) -> bool {
        self.flying.load(Ordering::Acquire)
    }

    /// Starts the supervision loop; no-op when already flying.
    ///
    /// A loop whose stop was signalled but never awaited to the end (an
    /// interrupted [`stop`](Self::stop)) counts as landed: it is joined first
    /// and replaced by a fresh one.
    pub async fn start(&self) {
        let mut runner = self.runner.lock().await;
        if let Some(handle) = runner.as_ref() {
            if !handle.is_stopping() {
                return;
            }
            handle.stop().await;
            *runner = None;
            self.flying.store(false, Ordering::Release);
        }
        *runner = Some(supervise_named(
            Arc::clone(&self.task),
            self.interval,
            Arc::clone(&self.name),
        ));
        self.flying.store(true, Ordering::Release);
    }

    /// Stops the supervision loop and waits for it to exit; no-op when landed.
    pub async fn stop(&self) {
        if !self.is_flying() {
            return;
        }
        let mut runner = self.runner.lock().await;
        if let Some(handle) = runner.as_ref() {
            handle.stop().await;
            *runner = None;
            self.flying.store(false, Ordering::Release);
        }
    }
}

impl std::fmt::Debug for ManagedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("flying", &self.is_flying())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::time;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::tasks::TaskFn;

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        Default::default()
    }

    /// Task that counts executions and the number of currently running copies.
    fn tracked(
        runs: &Arc<AtomicUsize>,
        live: &Arc<AtomicUsize>,
        peak: &Arc<AtomicUsize>,
    ) -> TaskRef {
        let (runs, live, peak) = (Arc::clone(runs), Arc::clone(live), Arc::clone(peak));
        TaskFn::arc(move |stop: CancellationToken| {
            let (runs, live, peak) = (Arc::clone(&runs), Arc::clone(&live), Arc::clone(&peak));
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                stop.cancelled().await;
                live.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn starts_landed_and_toggles() {
        let (runs, live, peak) = counters();
        let task = tracked(&runs, &live, &peak);
        let bird = ManagedTask::new(task, Duration::from_secs(20), "Betty");
        assert!(!bird.is_flying());
        assert_eq!(bird.name(), "Betty");
        assert_eq!(bird.interval(), Duration::from_secs(20));

        for _ in 0..3 {
            bird.start().await;
            assert!(bird.is_flying());
            time::sleep(Duration::from_millis(10)).await;
            bird.stop().await;
            assert!(!bird.is_flying());
            assert_eq!(live.load(Ordering::SeqCst), 0);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_and_stop_are_noops() {
        let (runs, live, peak) = counters();
        let bird = ManagedTask::new(tracked(&runs, &live, &peak), Duration::from_secs(1), "b");

        bird.stop().await;
        assert!(!bird.is_flying());

        bird.start().await;
        bird.start().await;
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(live.load(Ordering::SeqCst), 1);

        bird.stop().await;
        bird.stop().await;
        assert!(!bird.is_flying());
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggling_never_runs_two_loops() {
        let (runs, live, peak) = counters();
        let task = tracked(&runs, &live, &peak);
        let bird = ManagedTask::arc(task, Duration::from_millis(1), "racer");

        let mut set = tokio::task::JoinSet::new();
        for i in 0..32 {
            let bird = Arc::clone(&bird);
            set.spawn(async move {
                if i % 2 == 0 {
                    bird.start().await;
                } else {
                    bird.stop().await;
                }
            });
        }
        while let Some(res) = set.join_next().await {
            res.unwrap();
        }

        bird.stop().await;
        assert!(!bird.is_flying());
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(peak.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flying_for_three_seconds_runs_three_or_four_times() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let bird = ManagedTask::new(
            TaskFn::arc(move |_stop: CancellationToken| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
            Duration::from_secs(1),
            "Orlando",
        );

        bird.start().await;
        time::sleep(Duration::from_secs(3)).await;
        bird.stop().await;

        let n = runs.load(Ordering::SeqCst);
        assert!((3..=4).contains(&n), "Orlando has {n}");
    }

    #[tokio::test(start_paused = true)]
    async fn start_after_interrupted_stop_launches_new_loop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let bird = ManagedTask::new(
            TaskFn::arc(move |stop: CancellationToken| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    stop.cancelled().await;
                    time::sleep(Duration::from_millis(500)).await;
                    Ok(())
                }
            }),
            Duration::from_secs(1),
            "Wren",
        );

        bird.start().await;
        time::sleep(Duration::from_millis(10)).await;
        assert!(time::timeout(Duration::from_millis(100), bird.stop()).await.is_err());
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        bird.start().await;
        assert!(bird.is_flying());
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        bird.stop().await;
        assert!(!bird.is_flying());
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let noop = || -> TaskRef { TaskFn::arc(|_stop: CancellationToken| async { Ok(()) }) };
        let a = ManagedTask::new(noop(), Duration::from_secs(1), "same");
        let b = ManagedTask::new(noop(), Duration::from_secs(1), "same");
        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }
}
