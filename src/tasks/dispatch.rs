//! # Dispatcher: classification and discharge.
//!
//! Two functions, both free of registry state:
//! - [`classify`] turns a duck-typed [`Resource`] into a [`Task`] (once, at registration);
//! - [`discharge`] performs the disposal action of a task's variant.
//!
//! ## Precedence
//! ```text
//! invocable ──► Callable
//!     │ no
//! disconnectable ──► Disposable
//!     │ no
//! destructible ──► Destructible
//!     │ no
//! closeable ──► Closeable
//!     │ no
//! maid ──► Nested
//!     │ no
//! MaidError::Unclassifiable
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{MaidError, TaskError};
use crate::tasks::resource::Resource;
use crate::tasks::task::Task;

/// Classifies a resource by the first capability it exposes.
pub fn classify<R: Resource + ?Sized>(resource: Arc<R>) -> Result<Task, MaidError> {
    if let Some(f) = Arc::clone(&resource).invocable() {
        return Ok(Task::Callable(Box::new(move || f.invoke())));
    }
    if let Some(d) = Arc::clone(&resource).disconnectable() {
        return Ok(Task::Disposable(Box::new(d)));
    }
    if let Some(d) = Arc::clone(&resource).destructible() {
        return Ok(Task::Destructible(Box::new(d)));
    }
    if let Some(c) = Arc::clone(&resource).closeable() {
        return Ok(Task::Closeable(Box::new(c)));
    }
    if let Some(maid) = resource.maid() {
        return Ok(Task::Nested(maid));
    }
    Err(MaidError::Unclassifiable {
        type_name: resource.type_name(),
    })
}

/// Runs the disposal action for `task`.
///
/// With `catch_panics`, a panicking action is reported as [`TaskError::Panicked`]
/// instead of unwinding into the caller.
pub fn discharge(task: Task, catch_panics: bool) -> Result<(), TaskError> {
    if !catch_panics {
        return run(task);
    }
    match panic::catch_unwind(AssertUnwindSafe(move || run(task))) {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    }
}

fn run(task: Task) -> Result<(), TaskError> {
    match task {
        Task::Callable(f) => f(),
        Task::Disposable(d) => d.disconnect(),
        Task::Destructible(d) => d.destroy(),
        Task::Closeable(c) => c.close(),
        Task::Nested(maid) => maid.drain().map_err(TaskError::Nested),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
