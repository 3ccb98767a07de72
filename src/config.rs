//! # Registry configuration.
//!
//! Provides [`RegistryConfig`], the settings of a [`Registry`](crate::Registry).
//!
//! ## Sentinel values
//! - `land_concurrency = 0` → unlimited (one concurrent stop per selected task)
//! - `journal_capacity = 0` → clamped to 1

/// What the journal does when its queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JournalPolicy {
    /// The registry call that emits the action waits until the consumer makes room.
    ///
    /// A subscriber must keep draining the journal, otherwise every mutating
    /// registry call eventually blocks.
    #[default]
    Block,
    /// The action is dropped (and a warning logged); the registry call proceeds.
    DropNewest,
}

/// Configuration for a [`Registry`](crate::Registry).
///
/// ## Field semantics
/// - `journal_capacity`: bounded queue size of the journal (min 1)
/// - `journal_policy`: behavior of a full journal queue
/// - `land_concurrency`: maximum simultaneous stops during a bulk land (`0` = unlimited)
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Capacity of the journal queue.
    pub journal_capacity: usize,

    /// Behavior when the journal queue is full.
    pub journal_policy: JournalPolicy,

    /// Maximum number of tasks stopped concurrently by one land operation.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = at most `n` stops in flight
    pub land_concurrency: usize,
}

impl RegistryConfig {
    /// Returns the land concurrency limit as an `Option`.
    #[inline]
    pub fn land_limit(&self) -> Option<usize> {
        if self.land_concurrency == 0 {
            None
        } else {
            Some(self.land_concurrency)
        }
    }

    /// Returns the journal capacity clamped to a minimum of 1.
    #[inline]
    pub fn journal_capacity_clamped(&self) -> usize {
        self.journal_capacity.max(1)
    }
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `journal_capacity = 64`
    /// - `journal_policy = JournalPolicy::Block`
    /// - `land_concurrency = 0` (unlimited)
    fn default() -> Self {
        Self {
            journal_capacity: 64,
            journal_policy: JournalPolicy::default(),
            land_concurrency: 0,
        }
    }
}
