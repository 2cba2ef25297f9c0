//! # Maid: the public container facade.
//!
//! [`Maid`] is a cheap-to-clone handle over a shared task registry. Every clone
//! sees the same tasks and the same lifecycle state; the registry is drained when
//! the last handle is dropped.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use maid::{Maid, Task};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let maid = Maid::new();
//!
//! let h = Arc::clone(&hits);
//! maid.add(Task::call(move || { h.fetch_add(1, Ordering::SeqCst); })).unwrap();
//!
//! let child = Maid::new();
//! let h = Arc::clone(&hits);
//! child.add(Task::call(move || { h.fetch_add(1, Ordering::SeqCst); })).unwrap();
//! maid.add(child).unwrap();
//!
//! maid.drain().unwrap();
//! assert_eq!(hits.load(Ordering::SeqCst), 2);
//! assert!(maid.is_cleaned());
//! ```

use std::fmt;
use std::ptr;
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use crate::core::binding::{self, Lifecycle};
use crate::core::builder::MaidBuilder;
use crate::core::config::Config;
use crate::core::registry::Registry;
use crate::error::{DischargeReport, MaidError};
use crate::events::Bus;
use crate::tasks::{IntoTask, Resource, Task, TaskKey};

/// Deferred-disposal container.
///
/// - `Active` until the first drain, then `Cleaned` forever.
/// - Tasks added to a cleaned maid are discharged before `add` returns.
/// - `drain`/`destroy` never leave anything behind, whatever the individual outcomes.
#[derive(Clone)]
pub struct Maid {
    inner: Arc<Registry>,
}

impl Maid {
    /// Creates an empty, active maid with the default [`Config`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a builder for a named or observed maid.
    pub fn builder() -> MaidBuilder {
        MaidBuilder::new(Config::default())
    }

    pub(crate) fn from_parts(cfg: &Config, bus: Option<Bus>) -> Self {
        Self {
            inner: Arc::new(Registry::new(cfg, bus)),
        }
    }

    /// Registers one task and returns its key.
    ///
    /// # Errors
    /// - [`MaidError::Unclassifiable`] / [`MaidError::EmptyTask`]: nothing registered.
    /// - [`MaidError::SelfNesting`]: the task is this very maid.
    /// - [`MaidError::Discharge`]: the maid was already cleaned and the task failed
    ///   while being discharged on the spot.
    pub fn add<T: IntoTask>(&self, task: T) -> Result<TaskKey, MaidError> {
        let task = task.into_task()?;
        self.inner.insert(task)
    }

    /// Registers every element independently.
    ///
    /// Returns one outcome per element, in order: a failing element does not stop the
    /// batch, and the keys of the registered ones stay available for [`Maid::remove`].
    pub fn add_all<I>(&self, tasks: I) -> Vec<Result<TaskKey, MaidError>>
    where
        I: IntoIterator,
        I::Item: IntoTask,
    {
        tasks.into_iter().map(|task| self.add(task)).collect()
    }

    /// Detaches a task without discharging it; ownership goes back to the caller.
    ///
    /// Returns `None` for unknown keys, keys already removed, or a cleaned maid.
    pub fn remove(&self, key: TaskKey) -> Option<Task> {
        self.inner.remove(key)
    }

    /// Drains this maid when `lifecycle` terminates.
    ///
    /// Returns the key of the subscription task, or `None` if `lifecycle` had already
    /// terminated and the maid was drained immediately.
    pub fn bind(&self, lifecycle: &dyn Lifecycle) -> Result<Option<TaskKey>, MaidError> {
        binding::bind(&self.inner, lifecycle)
    }

    /// Drains this maid when `token` is cancelled.
    ///
    /// Spawns a watcher on the current tokio runtime; the watcher is registered as a
    /// closeable task, so an explicit drain aborts it.
    ///
    /// # Errors
    /// [`MaidError::NoRuntime`] outside a tokio runtime (unless the token is already
    /// cancelled, in which case the maid is drained immediately).
    pub fn bind_token(&self, token: CancellationToken) -> Result<Option<TaskKey>, MaidError> {
        binding::bind_token(&self.inner, token)
    }

    /// Discharges every held task and moves to the `Cleaned` state.
    ///
    /// Idempotent: later calls are no-ops. Failures are collected, not short-circuited.
    pub fn drain(&self) -> Result<(), DischargeReport> {
        self.inner.drain()
    }

    /// Same as [`Maid::drain`].
    pub fn destroy(&self) -> Result<(), DischargeReport> {
        self.drain()
    }

    /// Number of tasks currently held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once drained.
    pub fn is_cleaned(&self) -> bool {
        self.inner.is_cleaned()
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// True if both handles point at the same container.
    pub fn ptr_eq(&self, other: &Maid) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Weak handle that does not keep the container alive.
    pub(crate) fn downgrade(&self) -> Weak<Registry> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn is(&self, weak: &Weak<Registry>) -> bool {
        ptr::eq(Arc::as_ptr(&self.inner), weak.as_ptr())
    }

    pub(crate) fn is_registry(&self, registry: &Registry) -> bool {
        ptr::eq(Arc::as_ptr(&self.inner), registry)
    }
}

impl Default for Maid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Maid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maid")
            .field("name", &self.name())
            .field("tasks", &self.len())
            .field("cleaned", &self.is_cleaned())
            .finish()
    }
}

impl Resource for Maid {
    fn maid(&self) -> Option<Maid> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Lifetime;
    use crate::error::TaskError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(hits: &Arc<AtomicUsize>) -> Task {
        let hits = Arc::clone(hits);
        Task::call(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    struct Opaque;
    impl Resource for Opaque {}

    #[test]
    fn test_add_rejects_unclassifiable_and_empty() {
        let maid = Maid::new();
        let err = maid.add(Arc::new(Opaque)).unwrap_err();
        assert_eq!(err.as_label(), "maid_unclassifiable");
        let err = maid.add(None::<Task>).unwrap_err();
        assert_eq!(err.as_label(), "maid_empty_task");
        assert!(maid.is_empty());
    }

    #[test]
    fn test_add_all_processes_whole_batch() {
        let maid = Maid::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let batch = vec![Some(counting(&hits)), None, Some(counting(&hits))];

        let outcomes = maid.add_all(batch);
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[1], Err(MaidError::EmptyTask)));
        assert_eq!(maid.len(), 2);

        let first = *outcomes[0].as_ref().unwrap();
        assert!(maid.remove(first).is_some());
        assert_eq!(maid.len(), 1);

        maid.drain().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_all_after_clean_discharges_each() {
        let maid = Maid::new();
        maid.drain().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let outcomes = maid.add_all([counting(&hits), counting(&hits), counting(&hits)]);
        assert!(outcomes.iter().all(Result::is_ok));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_destroy_is_drain() {
        let maid = Maid::new();
        let hits = Arc::new(AtomicUsize::new(0));
        maid.add(counting(&hits)).unwrap();
        maid.destroy().unwrap();
        maid.drain().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_clone_drop_drains() {
        let hits = Arc::new(AtomicUsize::new(0));
        let maid = Maid::new();
        maid.add(counting(&hits)).unwrap();
        let clone = maid.clone();
        assert!(clone.ptr_eq(&maid));

        drop(maid);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        drop(clone);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_self_nesting_does_not_block_drop() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let maid = Maid::new();
            maid.add(counting(&hits)).unwrap();
            assert!(maid.add(maid.clone()).is_err());
            assert!(maid.add(Arc::new(maid.clone())).is_err());
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_add_during_drain() {
        let maid = Maid::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let (inner, h) = (maid.clone(), Arc::clone(&hits));
        maid.add(Task::call(move || {
            inner.add(counting(&h)).unwrap();
        }))
        .unwrap();

        maid.drain().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bind_fires_once() {
        let lifetime = Lifetime::new();
        let maid = Maid::new();
        let hits = Arc::new(AtomicUsize::new(0));
        maid.add(counting(&hits)).unwrap();

        let key = maid.bind(&lifetime).unwrap();
        assert!(key.is_some());
        assert_eq!(maid.len(), 2);

        lifetime.terminate();
        lifetime.terminate();
        assert!(maid.is_cleaned());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bind_to_terminated_drains_now() {
        let lifetime = Lifetime::new();
        lifetime.terminate();
        let maid = Maid::new();
        let hits = Arc::new(AtomicUsize::new(0));
        maid.add(counting(&hits)).unwrap();

        assert_eq!(maid.bind(&lifetime).unwrap(), None);
        assert!(maid.is_cleaned());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_drain_unsubscribes() {
        let lifetime = Lifetime::new();
        let maid = Maid::new();
        maid.bind(&lifetime).unwrap();
        assert_eq!(lifetime.listeners(), 1);

        maid.drain().unwrap();
        assert_eq!(lifetime.listeners(), 0);
    }

    #[test]
    fn test_bind_reports_immediate_failures() {
        let lifetime = Lifetime::new();
        lifetime.terminate();
        let maid = Maid::new();
        maid.add(Task::try_call(|| Err(TaskError::fail("x"))))
            .unwrap();

        let err = maid.bind(&lifetime).unwrap_err();
        assert_eq!(err.as_label(), "maid_discharge_failed");
        assert!(maid.is_cleaned());
    }

    #[test]
    fn test_bind_token_requires_runtime() {
        let maid = Maid::new();
        let err = maid.bind_token(CancellationToken::new()).unwrap_err();
        assert!(matches!(err, MaidError::NoRuntime));

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert_eq!(maid.bind_token(cancelled).unwrap(), None);
        assert!(maid.is_cleaned());
    }

    #[test]
    fn test_debug_output() {
        let maid = Maid::builder().with_name("ui").build();
        let text = format!("{maid:?}");
        assert!(text.contains("\"ui\""));
        assert!(text.contains("cleaned: false"));
    }
}
