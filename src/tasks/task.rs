//! # Task model: one registered cleanup obligation.
//!
//! A [`Task`] is a tagged union over the kinds of obligation a [`Maid`] can hold.
//! Each variant carries exactly what its discharge action needs, so the decision
//! "how do I dispose of this?" is made once, when the task is built, and never
//! repeated at drain time.
//!
//! | Variant          | Holds                                    | Discharge           |
//! |------------------|------------------------------------------|---------------------|
//! | `Callable`       | `FnOnce() -> Result<(), TaskError>`      | call it             |
//! | `Disposable`     | [`Disconnect`] value                     | `disconnect()`      |
//! | `Destructible`   | [`Destroy`] value                        | `destroy()`         |
//! | `Closeable`      | [`Close`] value (tokio task, token, ...) | `close()`           |
//! | `Nested`         | another [`Maid`]                         | drain it            |
//!
//! [`TaskKey`] is the opaque handle returned on registration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::core::Maid;
use crate::error::TaskError;
use crate::tasks::capability::{Close, Destroy, Disconnect};

/// Global counter for task keys. Keys are unique across every maid in the process.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Boxed zero-argument deferred action.
pub type Callback = Box<dyn FnOnce() -> Result<(), TaskError> + Send + 'static>;

/// Opaque key of a registered task.
///
/// Only ever handed back to the maid that returned it (see [`Maid::remove`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey(u64);

impl TaskKey {
    pub(crate) fn next() -> Self {
        TaskKey(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Fieldless tag of a [`Task`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Callable,
    Disposable,
    Destructible,
    Closeable,
    Nested,
}

impl TaskKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskKind::Callable => "callable",
            TaskKind::Disposable => "disposable",
            TaskKind::Destructible => "destructible",
            TaskKind::Closeable => "closeable",
            TaskKind::Nested => "nested",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// # One cleanup obligation.
///
/// Build tasks with the constructors below, or let [`Maid::add`] convert a value
/// through [`IntoTask`](crate::IntoTask).
///
/// # Example
/// ```
/// use maid::{Task, TaskKind};
///
/// let task = Task::call(|| println!("bye"));
/// assert_eq!(task.kind(), TaskKind::Callable);
/// ```
pub enum Task {
    Callable(Callback),
    Disposable(Box<dyn Disconnect>),
    Destructible(Box<dyn Destroy>),
    Closeable(Box<dyn Close>),
    Nested(Maid),
}

impl Task {
    /// Wraps an infallible closure.
    pub fn call<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task::Callable(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// Wraps a closure that may report a disposal failure.
    pub fn try_call<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        Task::Callable(Box::new(f))
    }

    /// Wraps a subscription-like value.
    pub fn disconnect(value: impl Disconnect) -> Self {
        Task::Disposable(Box::new(value))
    }

    /// Wraps an owned object that must be destroyed.
    pub fn destroy(value: impl Destroy) -> Self {
        Task::Destructible(Box::new(value))
    }

    /// Wraps a cooperative unit of work that must be closed.
    pub fn close(value: impl Close) -> Self {
        Task::Closeable(Box::new(value))
    }

    /// Wraps another maid; draining the parent drains it too.
    pub fn nested(maid: Maid) -> Self {
        Task::Nested(maid)
    }

    /// Returns the variant tag.
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Callable(_) => TaskKind::Callable,
            Task::Disposable(_) => TaskKind::Disposable,
            Task::Destructible(_) => TaskKind::Destructible,
            Task::Closeable(_) => TaskKind::Closeable,
            Task::Nested(_) => TaskKind::Nested,
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Nested(maid) => f.debug_tuple("Nested").field(&maid.name()).finish(),
            other => f.debug_tuple("Task").field(&other.kind()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    struct Conn;
    impl Disconnect for Conn {
        fn disconnect(&self) -> Result<(), TaskError> {
            Ok(())
        }
    }

    #[test]
    fn test_keys_are_unique_and_ordered() {
        let a = TaskKey::next();
        let b = TaskKey::next();
        assert_ne!(a, b);
        assert!(a < b);
        assert!(a.to_string().starts_with("task-"));
    }

    #[test]
    fn test_constructors_tag_variants() {
        assert_eq!(Task::call(|| {}).kind(), TaskKind::Callable);
        assert_eq!(Task::try_call(|| Ok(())).kind(), TaskKind::Callable);
        assert_eq!(Task::disconnect(Conn).kind(), TaskKind::Disposable);
        assert_eq!(
            Task::close(CancellationToken::new()).kind(),
            TaskKind::Closeable
        );
        assert_eq!(Task::nested(Maid::new()).kind(), TaskKind::Nested);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(TaskKind::Destructible.as_label(), "destructible");
        assert_eq!(TaskKind::Nested.to_string(), "nested");
    }
}
