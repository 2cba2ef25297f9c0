//! # Events emitted by maids.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registry events**: tasks entering or leaving a maid
//! - **Drain events**: start, per-task outcome, completion
//! - **Binding events**: an external lifecycle ended and triggered a drain
//!
//! The [`Event`] struct carries metadata such as timestamp, maid name, task key,
//! task kind, failure reason and counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use maid::{Event, EventKind, TaskKind};
//!
//! let ev = Event::new(EventKind::DischargeFailed)
//!     .with_maid("session")
//!     .with_task_kind(TaskKind::Disposable)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::DischargeFailed);
//! assert_eq!(ev.maid.as_deref(), Some("session"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::{TaskKey, TaskKind};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of maid events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// Task registered on an active maid.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `key`: task key
    /// - `task_kind`: variant
    TaskAdded,

    /// Task detached by the owner without being discharged.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `key`: task key
    /// - `task_kind`: variant
    TaskRemoved,

    /// Task arrived after the maid was cleaned and was discharged immediately.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `key`: task key
    /// - `task_kind`: variant
    /// - `reason`: failure message (only if the discharge failed)
    LateTaskDischarged,

    // === Drain events ===
    /// Drain took ownership of the task set.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `count`: number of tasks about to be discharged
    DrainStarted,

    /// One task discharged successfully.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `key`: task key
    /// - `task_kind`: variant
    TaskDischarged,

    /// One task failed to discharge; the drain continues.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `key`: task key
    /// - `task_kind`: variant
    /// - `reason`: failure message
    DischargeFailed,

    /// Drain finished; the maid is cleaned.
    ///
    /// Sets:
    /// - `maid`: maid name
    /// - `count`: number of failed tasks
    Drained,

    // === Binding events ===
    /// A bound lifecycle terminated and triggered a drain.
    ///
    /// Sets:
    /// - `maid`: maid name
    BindingFired,
}

/// Maid event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the maid that emitted the event.
    pub maid: Option<Arc<str>>,
    /// Key of the task, if applicable.
    pub key: Option<TaskKey>,
    /// Variant of the task, if applicable.
    pub task_kind: Option<TaskKind>,
    /// Human-readable reason (failure details).
    pub reason: Option<Arc<str>>,
    /// Task count (drain size or failure count).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            maid: None,
            key: None,
            task_kind: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches the maid name.
    #[inline]
    pub fn with_maid(mut self, maid: impl Into<Arc<str>>) -> Self {
        self.maid = Some(maid.into());
        self
    }

    /// Attaches a task key.
    #[inline]
    pub fn with_key(mut self, key: TaskKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches a task kind.
    #[inline]
    pub fn with_task_kind(mut self, kind: TaskKind) -> Self {
        self.task_kind = Some(kind);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::DischargeFailed)
            || (self.kind == EventKind::LateTaskDischarged && self.reason.is_some())
    }
}
