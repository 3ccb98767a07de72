//! # Example: a flock of pollers
//!
//! Three pollers share the name "poller", one "flaky" task fails every run.
//! The flock is raised, the pollers are landed by name, then everything is
//! dissolved with landing.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example flock
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flockvisor::{ManagedTask, Registry, Task, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Polls until stopped, counting its rounds.
struct Poller {
    rounds: AtomicU32,
}

#[async_trait]
impl Task for Poller {
    async fn run(&self, stop: CancellationToken) -> Result<(), TaskError> {
        loop {
            tokio::select! {
                _ = stop.cancelled() => return Err(TaskError::Canceled),
                _ = tokio::time::sleep(Duration::from_millis(200)) => {
                    let n = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(rounds = n, "poll");
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let flock = Registry::new();

    for _ in 0..3 {
        let poller: TaskRef = Arc::new(Poller {
            rounds: AtomicU32::new(0),
        });
        flock
            .include(ManagedTask::arc(poller, Duration::from_secs(1), "poller"))
            .await;
    }
    let flaky: TaskRef = TaskFn::arc(|_stop: CancellationToken| async {
        Err(TaskError::fail("upstream unavailable"))
    });
    flock
        .include(ManagedTask::arc(flaky, Duration::from_millis(300), "flaky"))
        .await;

    let raised = flock.raise(&[]).await;
    println!("raised {} tasks", raised.len());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let landed = flock.land(&["poller"]).await;
    println!("landed {} pollers", landed.len());

    for task in flock.select(&[]).await {
        println!(
            "{} {:<8} interval={:?} flying={}",
            task.id(),
            task.name(),
            task.interval(),
            task.is_flying()
        );
    }

    let removed = flock.dissolve(true).await;
    println!("dissolved {} tasks", removed.len());
}
