//! # Task registry: ordered, keyed set of live tasks.
//!
//! The registry is the state behind every [`Maid`](crate::Maid) handle.
//!
//! ## Architecture
//! ```text
//! insert(task) ──► lock ──► Active?  ──yes──► map.insert(key, task) ──► TaskAdded
//!                              │no
//!                              └──► unlock ──► discharge(task) ──► LateTaskDischarged
//!
//! remove(key)  ──► lock ──► map.shift_remove(key) ──► TaskRemoved (no discharge)
//!
//! drain()      ──► lock ──► replace(state, Cleaned) ──► unlock
//!                              └──► for (key, task) in insertion order:
//!                                      discharge(task) ──► TaskDischarged | DischargeFailed
//!                                   ──► Drained
//! ```
//!
//! ## Rules
//! - The `Active -> Cleaned` flip and the take of the task set are one critical section;
//!   concurrent drains discharge the set once, a concurrent insert is either taken by
//!   the drain or discharged as late.
//! - Discharge always runs outside the lock, so actions may re-enter the maid.
//! - One failing task never prevents the others from being discharged. With
//!   `catch_panics` off, the first panic is re-raised only after every task ran.
//! - A maid never holds itself: that would be a cycle no drop could break.
//! - Dropping the registry while still active drains it.

use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::error::{DischargeFailure, DischargeReport, MaidError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::dispatch;
use crate::tasks::{Task, TaskKey};

/// Lifecycle state of a registry.
enum State {
    /// Accepting and holding tasks, in insertion order.
    Active(IndexMap<TaskKey, Task>),
    /// Terminal: everything taken by a drain.
    Cleaned,
}

/// Shared state of a maid.
pub(crate) struct Registry {
    state: Mutex<State>,
    name: Arc<str>,
    catch_panics: bool,
    bus: Option<Bus>,
}

impl Registry {
    /// Creates an empty, active registry.
    pub(crate) fn new(cfg: &Config, bus: Option<Bus>) -> Self {
        let tasks = match cfg.capacity_hint() {
            Some(n) => IndexMap::with_capacity(n),
            None => IndexMap::new(),
        };
        Self {
            state: Mutex::new(State::Active(tasks)),
            name: Arc::from(cfg.name.as_ref()),
            catch_panics: cfg.catch_panics,
            bus,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Stores `task` under a fresh key, or discharges it at once if already cleaned.
    pub(crate) fn insert(&self, task: Task) -> Result<TaskKey, MaidError> {
        if let Task::Nested(maid) = &task {
            if maid.is_registry(self) {
                return Err(MaidError::SelfNesting);
            }
        }

        let key = TaskKey::next();
        let kind = task.kind();

        let late = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Active(tasks) => {
                    tasks.insert(key, task);
                    None
                }
                State::Cleaned => Some(task),
            }
        };

        let Some(task) = late else {
            debug!(maid = %self.name, %key, %kind, "task added");
            self.publish(|| Event::new(EventKind::TaskAdded).with_key(key).with_task_kind(kind));
            return Ok(key);
        };

        debug!(maid = %self.name, %key, %kind, "maid already cleaned; discharging task now");
        match dispatch::discharge(task, self.catch_panics) {
            Ok(()) => {
                self.publish(|| {
                    Event::new(EventKind::LateTaskDischarged)
                        .with_key(key)
                        .with_task_kind(kind)
                });
                Ok(key)
            }
            Err(error) => {
                warn!(maid = %self.name, %key, %kind, %error, "late task failed to discharge");
                self.publish(|| {
                    Event::new(EventKind::LateTaskDischarged)
                        .with_key(key)
                        .with_task_kind(kind)
                        .with_reason(error.to_string())
                });
                let mut report = DischargeReport::new();
                report.push(DischargeFailure { key, kind, error });
                Err(MaidError::Discharge(report))
            }
        }
    }

    /// Detaches the task under `key` without discharging it.
    pub(crate) fn remove(&self, key: TaskKey) -> Option<Task> {
        let removed = match &mut *self.state.lock() {
            State::Active(tasks) => tasks.shift_remove(&key),
            State::Cleaned => None,
        };

        if let Some(task) = &removed {
            let kind = task.kind();
            debug!(maid = %self.name, %key, %kind, "task removed");
            self.publish(|| Event::new(EventKind::TaskRemoved).with_key(key).with_task_kind(kind));
        }
        removed
    }

    /// Takes every held task, marks the registry cleaned and discharges them.
    ///
    /// A no-op returning `Ok(())` when already cleaned.
    pub(crate) fn drain(&self) -> Result<(), DischargeReport> {
        let tasks = match mem::replace(&mut *self.state.lock(), State::Cleaned) {
            State::Active(tasks) => tasks,
            State::Cleaned => return Ok(()),
        };

        debug!(maid = %self.name, count = tasks.len(), "drain started");
        self.publish(|| Event::new(EventKind::DrainStarted).with_count(tasks.len()));

        let mut report = DischargeReport::new();
        let mut panicked: Option<Box<dyn Any + Send>> = None;
        for (key, task) in tasks {
            let kind = task.kind();
            let catch_panics = self.catch_panics;
            let attempt = AssertUnwindSafe(|| dispatch::discharge(task, catch_panics));
            let outcome = match panic::catch_unwind(attempt) {
                Ok(res) => res,
                Err(payload) => {
                    let error = TaskError::Panicked {
                        info: dispatch::panic_message(payload.as_ref()),
                    };
                    panicked.get_or_insert(payload);
                    Err(error)
                }
            };
            match outcome {
                Ok(()) => {
                    self.publish(|| {
                        Event::new(EventKind::TaskDischarged)
                            .with_key(key)
                            .with_task_kind(kind)
                    });
                }
                Err(error) => {
                    warn!(maid = %self.name, %key, %kind, %error, "task failed to discharge");
                    self.publish(|| {
                        Event::new(EventKind::DischargeFailed)
                            .with_key(key)
                            .with_task_kind(kind)
                            .with_reason(error.to_string())
                    });
                    report.push(DischargeFailure { key, kind, error });
                }
            }
        }

        debug!(maid = %self.name, failed = report.len(), "drain finished");
        self.publish(|| Event::new(EventKind::Drained).with_count(report.len()));
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        report.into_result()
    }

    /// Number of tasks currently held (0 once cleaned).
    pub(crate) fn len(&self) -> usize {
        match &*self.state.lock() {
            State::Active(tasks) => tasks.len(),
            State::Cleaned => 0,
        }
    }

    pub(crate) fn is_cleaned(&self) -> bool {
        matches!(*self.state.lock(), State::Cleaned)
    }

    /// Publishes an event tagged with this maid's name, if a bus is attached.
    pub(crate) fn publish(&self, build: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(build().with_maid(Arc::clone(&self.name)));
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if let Err(report) = self.drain() {
            warn!(maid = %self.name, %report, "maid dropped with failing tasks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Maid;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    fn registry() -> Registry {
        Registry::new(&Config::default(), None)
    }

    fn counting(counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Task::call(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_drain_discharges_once() {
        let reg = registry();
        let hits = Arc::new(AtomicUsize::new(0));
        reg.insert(counting(&hits)).unwrap();
        reg.insert(counting(&hits)).unwrap();
        assert_eq!(reg.len(), 2);

        reg.drain().unwrap();
        reg.drain().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(reg.is_cleaned());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn test_discharge_follows_insertion_order() {
        let reg = registry();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let order = Arc::clone(&order);
            reg.insert(Task::call(move || order.lock().push(i))).unwrap();
        }
        let extra = reg.insert(Task::call(|| {})).unwrap();
        reg.remove(extra).unwrap();

        reg.drain().unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_detaches_without_discharge() {
        let reg = registry();
        let hits = Arc::new(AtomicUsize::new(0));
        let key = reg.insert(counting(&hits)).unwrap();

        let task = reg.remove(key).unwrap();
        assert!(reg.remove(key).is_none());
        reg.drain().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        dispatch::discharge(task, true).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_insert_discharges_immediately() {
        let reg = registry();
        reg.drain().unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let key = reg.insert(counting(&hits)).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(reg.remove(key).is_none());
    }

    #[test]
    fn test_late_insert_failure_is_returned() {
        let reg = registry();
        reg.drain().unwrap();

        let err = reg
            .insert(Task::try_call(|| Err(TaskError::fail("late"))))
            .unwrap_err();
        match err {
            MaidError::Discharge(report) => assert_eq!(report.len(), 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let reg = registry();
        let hits = Arc::new(AtomicUsize::new(0));
        reg.insert(Task::try_call(|| Err(TaskError::fail("first"))))
            .unwrap();
        reg.insert(counting(&hits)).unwrap();
        reg.insert(Task::call(|| panic!("second"))).unwrap();
        reg.insert(counting(&hits)).unwrap();

        let report = reg.drain().unwrap_err();
        assert_eq!(report.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(reg.is_cleaned());
    }

    #[test]
    fn test_events_are_published() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let reg = Registry::new(
            &Config {
                name: "events".into(),
                ..Config::default()
            },
            Some(bus),
        );
        reg.insert(Task::call(|| {})).unwrap();
        reg.drain().unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| {
                assert_eq!(ev.maid.as_deref(), Some("events"));
                ev.kind
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskAdded,
                EventKind::DrainStarted,
                EventKind::TaskDischarged,
                EventKind::Drained,
            ]
        );
    }

    #[test]
    fn test_uncaught_panic_resumes_after_siblings() {
        let reg = Registry::new(
            &Config {
                catch_panics: false,
                ..Config::default()
            },
            None,
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        reg.insert(counting(&hits)).unwrap();
        reg.insert(Task::call(|| panic!("first"))).unwrap();
        reg.insert(Task::close(token.clone())).unwrap();
        reg.insert(Task::call(|| panic!("second"))).unwrap();
        reg.insert(counting(&hits)).unwrap();

        let payload = panic::catch_unwind(AssertUnwindSafe(|| reg.drain())).unwrap_err();
        assert_eq!(dispatch::panic_message(payload.as_ref()), "first");
        assert!(reg.is_cleaned());
        assert!(token.is_cancelled());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_self_nesting_is_rejected() {
        let maid = Maid::new();
        let err = maid.add(maid.clone()).unwrap_err();
        assert!(matches!(err, MaidError::SelfNesting));
        assert!(maid.is_empty());

        maid.drain().unwrap();
        let err = maid.add(maid.clone()).unwrap_err();
        assert!(matches!(err, MaidError::SelfNesting));
    }

    #[test]
    fn test_drop_drains() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let reg = registry();
            reg.insert(counting(&hits)).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
