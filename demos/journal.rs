//! # Example: watching the journal
//!
//! A consumer drains the registry journal while the main task includes,
//! raises, lands and removes tasks.
//!
//! ## Run
//! ```bash
//! cargo run --example journal
//! ```

use std::sync::Arc;
use std::time::Duration;

use flockvisor::{JournalPolicy, ManagedTask, Registry, RegistryConfig, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

fn idle() -> TaskRef {
    TaskFn::arc(|stop: CancellationToken| async move {
        stop.cancelled().await;
        Err(TaskError::Canceled)
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let flock = Arc::new(Registry::with_config(RegistryConfig {
        journal_capacity: 8,
        journal_policy: JournalPolicy::Block,
        land_concurrency: 2,
    }));

    let mut journal = flock.journal();
    let consumer = tokio::spawn(async move {
        while let Some(action) = journal.recv().await {
            println!("{action}");
        }
    });

    let betty = ManagedTask::arc(idle(), Duration::from_secs(5), "Betty");
    flock.include(Arc::clone(&betty)).await;
    for name in ["x", "x", "z"] {
        flock.include(ManagedTask::arc(idle(), Duration::from_secs(5), name)).await;
    }

    flock.raise(&["Betty"]).await;
    flock.raise(&["x", "y"]).await;
    flock.land(&[]).await;
    flock.take(&betty, true).await;
    flock.exclude(true, &["x"]).await;
    flock.dissolve(false).await;

    flock.close_journal();
    let _ = consumer.await;
}
