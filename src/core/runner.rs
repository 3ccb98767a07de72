//! # Runner: restart-on-exit loop for a single task function.
//!
//! [`supervise`] spawns a loop that executes a [`Task`] over and over until its
//! [`StopHandle`] is used. The loop is the only place a task function runs, so
//! executions of one task are strictly sequential.
//!
//! ## Lifecycle
//! ```text
//! supervise(task, interval, on_error) ──► StopHandle
//!      │
//!      └─► tokio::spawn(loop {
//!            ├─► stop already requested? ─► exit
//!            ├─► run_once(task, child token)
//!            │       ├─ Ok(())          ─► (nothing)
//!            │       ├─ Err(Canceled)   ─► (graceful, not reported)
//!            │       ├─ Err(Fail)       ─► on_error(&err)
//!            │       └─ panic           ─► on_error(&Panicked)
//!            └─► select! {
//!                  stop.cancelled() ─► exit
//!                  sleep(interval)  ─► next iteration
//!                }
//!          })
//!
//! StopHandle::stop()
//!   ├─► fast path: stopped flag set ─► return
//!   └─► lock ─► recheck ─► cancel token ─► await join ─► set stopped
//! ```
//!
//! ## Rules
//! - Failures never end the loop, nor does a panicking error handler; only
//!   the stop signal does.
//! - Restart delay is fixed (no backoff, no retry budget).
//! - `stop()` returns only after the loop has exited; racing callers wait
//!   behind the first one and never signal twice.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::{select, sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{error::TaskError, tasks::Task, tasks::TaskRef};

/// Callback receiving every reportable failure of a supervised task.
pub type ErrorHandler = Arc<dyn Fn(&TaskError) + Send + Sync>;

/// Starts supervising `task`, restarting it `interval` after every return.
///
/// Construction and start are the same operation: the loop is running when
/// this function returns. Must be called from within a tokio runtime.
///
/// Dropping every clone of the returned handle does **not** stop the loop.
pub fn supervise(
    task: TaskRef,
    interval: Duration,
    on_error: Option<ErrorHandler>,
) -> StopHandle {
    spawn_loop(task, interval, on_error, None)
}

/// Same as [`supervise`], but failures and stop transitions are logged under `name`.
pub fn supervise_named(
    task: TaskRef,
    interval: Duration,
    name: impl Into<Arc<str>>,
) -> StopHandle {
    let name: Arc<str> = name.into();
    info!(task = %name, interval = ?interval, "started");

    let log_name = Arc::clone(&name);
    let on_error: ErrorHandler = Arc::new(move |err: &TaskError| {
        warn!(
            task = %log_name,
            restart_after = ?interval,
            label = err.as_label(),
            error = %err,
            "task failed"
        );
    });
    spawn_loop(task, interval, Some(on_error), Some(name))
}

fn spawn_loop(
    task: TaskRef,
    interval: Duration,
    on_error: Option<ErrorHandler>,
    name: Option<Arc<str>>,
) -> StopHandle {
    let token = CancellationToken::new();
    let join = tokio::spawn(run_loop(task, interval, on_error, token.clone()));

    StopHandle {
        inner: Arc::new(Inner {
            token,
            join: Mutex::new(Some(join)),
            stopped: AtomicBool::new(false),
            name,
        }),
    }
}

async fn run_loop(
    task: TaskRef,
    interval: Duration,
    on_error: Option<ErrorHandler>,
    stop: CancellationToken,
) {
    loop {
        if stop.is_cancelled() {
            break;
        }
        if let Err(err) = run_once(task.as_ref(), &stop).await {
            if let Some(handler) = on_error.as_ref().filter(|_| err.is_reportable()) {
                report(handler, &err);
            }
        }

        let sleep = time::sleep(interval);
        tokio::pin!(sleep);
        select! {
            biased;
            _ = stop.cancelled() => break,
            _ = &mut sleep => {}
        }
    }
}

/// Invokes `handler`; a panicking handler is logged and does not end the loop.
fn report(handler: &ErrorHandler, err: &TaskError) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(err))) {
        warn!(
            panic = %panic_message(panic.as_ref()),
            label = err.as_label(),
            "error handler panicked"
        );
    }
}

/// Executes one run of `task` with a child of the stop token; panics become errors.
async fn run_once(task: &dyn Task, stop: &CancellationToken) -> Result<(), TaskError> {
    match AssertUnwindSafe(task.run(stop.child_token()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic) => Err(TaskError::Panicked {
            info: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct Inner {
    /// Stop signal shared with the loop.
    token: CancellationToken,
    /// Termination barrier; `None` once the loop has been joined.
    join: Mutex<Option<JoinHandle<()>>>,
    /// Set only after the loop has been observed to exit.
    stopped: AtomicBool,
    name: Option<Arc<str>>,
}

/// Handle that stops a supervised loop.
///
/// Cheap to clone; all clones refer to the same loop.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<Inner>,
}

impl StopHandle {
    /// Stops the loop and waits until it has fully exited.
    ///
    /// Idempotent and safe to call from many tasks at once. The first caller
    /// sends the stop signal and waits for the loop; concurrent callers queue
    /// on the internal lock and return once the first has finished. Later
    /// callers return immediately.
    ///
    /// Waits indefinitely if the task function ignores its stop signal.
    /// Cancel-safe: if this future is dropped mid-wait, the next call resumes
    /// waiting for the same loop.
    pub async fn stop(&self) {
        if self.inner.stopped.load(Ordering::Acquire) {
            return;
        }
        let mut join = self.inner.join.lock().await;
        if self.inner.stopped.load(Ordering::Acquire) {
            return;
        }

        if let Some(name) = &self.inner.name {
            info!(task = %name, "stopping");
        }
        self.inner.token.cancel();
        if let Some(handle) = join.as_mut() {
            if let Err(err) = handle.await {
                warn!(error = %err, "supervision loop ended abnormally");
            }
        }
        *join = None;
        self.inner.stopped.store(true, Ordering::Release);

        if let Some(name) = &self.inner.name {
            info!(task = %name, "stopped");
        }
    }

    /// Returns `true` once the stop signal has been sent, even if the loop has not exited yet.
    pub fn is_stopping(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Returns `true` once a [`stop`](Self::stop) call has observed the loop exit.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("name", &self.inner.name)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
