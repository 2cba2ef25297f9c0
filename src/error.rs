//! Error types used by maids and by the disposal actions they run.
//!
//! This module defines three layers:
//!
//! - [`TaskError`] — a single disposal action failed (returned by capability impls).
//! - [`DischargeReport`] — the composite failure of a drain: every [`DischargeFailure`]
//!   collected while the remaining tasks kept being discharged.
//! - [`MaidError`] — errors surfaced by the container API itself (classification,
//!   empty values, late discharge failures, missing runtime).
//!
//! All enums provide `as_label` for logs/metrics.

use std::fmt;

use thiserror::Error;

use crate::tasks::{TaskKey, TaskKind};

/// # Errors produced by a disposal action.
///
/// Returned by [`Invoke`](crate::Invoke), [`Disconnect`](crate::Disconnect),
/// [`Destroy`](crate::Destroy) and [`Close`](crate::Close) implementations, and
/// synthesized by the dispatcher for panics and nested maids.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The action ran and reported a failure.
    #[error("disposal failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action panicked; the panic was caught and isolated.
    #[error("disposal panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// A nested maid drained with failures of its own.
    #[error("nested maid failed: {0}")]
    Nested(DischargeReport),
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use maid::TaskError;
    ///
    /// let err = TaskError::fail("socket already closed");
    /// assert_eq!(err.as_label(), "task_failed");
    /// assert_eq!(err.to_string(), "disposal failed: socket already closed");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Nested(_) => "task_nested_failed",
        }
    }
}

/// One task that failed while a maid was draining.
#[derive(Debug)]
pub struct DischargeFailure {
    /// Key the task was registered under.
    pub key: TaskKey,
    /// Variant the task was classified as.
    pub kind: TaskKind,
    /// What went wrong.
    pub error: TaskError,
}

impl fmt::Display for DischargeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.key, self.kind, self.error)
    }
}

/// # Composite failure of a drain.
///
/// A drain never stops at the first failing task; every failure is recorded here
/// and the report is returned once all tasks have been attempted. The maid is
/// `Cleaned` regardless of what the report contains.
#[derive(Debug, Default)]
pub struct DischargeReport {
    failures: Vec<DischargeFailure>,
}

impl DischargeReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, failure: DischargeFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn merge(&mut self, other: DischargeReport) {
        self.failures.extend(other.failures);
    }

    /// Converts into `Ok(())` when nothing failed.
    pub(crate) fn into_result(self) -> Result<(), DischargeReport> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Failures in discharge order.
    pub fn failures(&self) -> &[DischargeFailure] {
        &self.failures
    }

    /// Consumes the report, returning its failures.
    pub fn into_failures(self) -> Vec<DischargeFailure> {
        self.failures
    }

    /// Number of failed tasks.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// True if no task failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DischargeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) failed to discharge", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DischargeReport {}

/// # Errors produced by the container API.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MaidError {
    /// The value exposes none of the recognized disposal capabilities.
    #[error("value of type `{type_name}` exposes no disposal capability")]
    Unclassifiable {
        /// Rust type name of the rejected value.
        type_name: &'static str,
    },

    /// An empty (`None`) value was offered as a task.
    #[error("empty task value")]
    EmptyTask,

    /// Discharging on a cleaned maid, or an immediate drain, reported failures.
    #[error(transparent)]
    Discharge(#[from] DischargeReport),

    /// A maid was offered as a task of itself.
    #[error("a maid cannot be nested into itself")]
    SelfNesting,

    /// Watching a cancellation token requires a tokio runtime in context.
    #[error("no tokio runtime available to watch the cancellation token")]
    NoRuntime,
}

impl MaidError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use maid::MaidError;
    ///
    /// assert_eq!(MaidError::EmptyTask.as_label(), "maid_empty_task");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            MaidError::Unclassifiable { .. } => "maid_unclassifiable",
            MaidError::EmptyTask => "maid_empty_task",
            MaidError::Discharge(_) => "maid_discharge_failed",
            MaidError::SelfNesting => "maid_self_nesting",
            MaidError::NoRuntime => "maid_no_runtime",
        }
    }
}
