//! # flockvisor
//!
//! **Flockvisor** keeps async tasks alive: a task is launched, restarted a
//! fixed interval after every return (success or failure), and runs until it
//! is explicitly told to stop. Groups of such tasks live in a [`Registry`]
//! that can start, stop, filter and observe them as a unit.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ManagedTask  │   │ ManagedTask  │   │ ManagedTask  │
//!     │   "x" #1     │   │   "x" #2     │   │   "z" #3     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry (flock)                                                 │
//! │  - RwLock<BTreeMap<TaskId, Arc<ManagedTask>>>                     │
//! │  - include / take / exclude / dissolve   (write lock)             │
//! │  - land / raise / select                 (read lock)              │
//! │  - Journal (bounded mpsc of Actions, Block or DropNewest)         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  StopHandle  │   │  StopHandle  │   │   (landed)   │
//!     │ restart loop │   │ restart loop │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────────────┘
//!            ▼                  ▼
//!      Task::run(stop)    Task::run(stop)
//! ```
//!
//! ### Lifecycle
//! ```text
//! ManagedTask::start() ──► supervise_named(task, interval, name) ──► StopHandle
//!
//! loop {
//!   ├─► run(task, child stop token)
//!   │       ├─ Ok            ─► (nothing)
//!   │       ├─ Err(Canceled) ─► (graceful)
//!   │       └─ Err / panic   ─► error handler (logged by named loops)
//!   └─► select! { stop ─► exit, sleep(interval) ─► again }
//! }
//!
//! ManagedTask::stop() ──► StopHandle::stop() ──► cancel ──► join ──► landed
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                        |
//! |-----------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Tasks**       | Define task functions as trait impls or closures.            | [`Task`], [`TaskFn`], [`TaskRef`]         |
//! | **Supervision** | Restart-on-exit loop with idempotent, awaited stop.          | [`supervise`], [`StopHandle`]             |
//! | **Managed**     | Named tasks toggled between landed and flying.               | [`ManagedTask`], [`TaskId`]               |
//! | **Registry**    | Bulk land/raise/exclude by name, journal of actions.         | [`Registry`], [`Action`], [`ActionKind`]  |
//! | **Errors**      | Typed task failures.                                         | [`TaskError`]                             |
//! | **Configuration** | Journal capacity/policy, bounded landing.                  | [`RegistryConfig`], [`JournalPolicy`]     |
//!
//! ## Logging
//! Lifecycle transitions and task failures are reported through [`tracing`];
//! install any subscriber to see them.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use flockvisor::{ManagedTask, Registry, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let flock = Registry::new();
//!
//!     let ticker: TaskRef = TaskFn::arc(|stop: CancellationToken| async move {
//!         tokio::select! {
//!             _ = stop.cancelled() => Err(TaskError::Canceled),
//!             _ = tokio::time::sleep(Duration::from_millis(10)) => Ok(()),
//!         }
//!     });
//!     flock.include(ManagedTask::arc(ticker, Duration::from_millis(50), "ticker")).await;
//!
//!     flock.raise(&["ticker"]).await;
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//!     flock.dissolve(true).await;
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use config::{JournalPolicy, RegistryConfig};
pub use crate::core::{ErrorHandler, Registry, StopHandle, supervise, supervise_named};
pub use error::TaskError;
pub use events::{Action, ActionKind};
pub use tasks::{ManagedTask, Task, TaskFn, TaskId, TaskRef};
