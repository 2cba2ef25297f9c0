//! # Duck-typed resources and task conversion.
//!
//! [`Resource`] lets an arbitrary object advertise which disposal capabilities it
//! has, without the maid knowing its concrete type. Every accessor defaults to
//! "absent"; an implementor overrides the ones it supports:
//!
//! ```
//! use std::sync::Arc;
//! use maid::{Disconnect, Maid, Resource, TaskError};
//!
//! struct Listener;
//!
//! impl Disconnect for Listener {
//!     fn disconnect(&self) -> Result<(), TaskError> { Ok(()) }
//! }
//!
//! impl Resource for Listener {
//!     fn disconnectable(self: Arc<Self>) -> Option<Arc<dyn Disconnect>> { Some(self) }
//! }
//!
//! let maid = Maid::new();
//! let value: Arc<dyn Resource> = Arc::new(Listener);
//! maid.add(value).unwrap();
//! ```
//!
//! [`IntoTask`] is the conversion used at the [`Maid::add`](crate::Maid::add)
//! boundary; resources go through [`classify`](crate::tasks::dispatch::classify).

use std::sync::Arc;

use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::core::Maid;
use crate::error::MaidError;
use crate::tasks::capability::{Close, Destroy, Disconnect, Invoke};
use crate::tasks::dispatch::classify;
use crate::tasks::task::Task;

/// Object that exposes disposal capabilities by shape.
///
/// When several capabilities are present the dispatcher picks one by fixed
/// precedence: invocable, disconnectable, destructible, closeable, maid.
pub trait Resource: Send + Sync + 'static {
    fn invocable(self: Arc<Self>) -> Option<Arc<dyn Invoke>> {
        None
    }

    fn disconnectable(self: Arc<Self>) -> Option<Arc<dyn Disconnect>> {
        None
    }

    fn destructible(self: Arc<Self>) -> Option<Arc<dyn Destroy>> {
        None
    }

    fn closeable(self: Arc<Self>) -> Option<Arc<dyn Close>> {
        None
    }

    fn maid(&self) -> Option<Maid> {
        None
    }

    /// Name used in classification errors.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Conversion of an argument value into a [`Task`].
///
/// Fails with [`MaidError::Unclassifiable`] for resources with no capability and
/// with [`MaidError::EmptyTask`] for `None`.
pub trait IntoTask {
    fn into_task(self) -> Result<Task, MaidError>;
}

impl IntoTask for Task {
    fn into_task(self) -> Result<Task, MaidError> {
        Ok(self)
    }
}

impl IntoTask for Maid {
    fn into_task(self) -> Result<Task, MaidError> {
        Ok(Task::Nested(self))
    }
}

impl<T: Send + 'static> IntoTask for JoinHandle<T> {
    fn into_task(self) -> Result<Task, MaidError> {
        Ok(Task::close(self))
    }
}

impl IntoTask for AbortHandle {
    fn into_task(self) -> Result<Task, MaidError> {
        Ok(Task::close(self))
    }
}

impl IntoTask for CancellationToken {
    fn into_task(self) -> Result<Task, MaidError> {
        Ok(Task::close(self))
    }
}

impl<R: Resource + ?Sized> IntoTask for Arc<R> {
    fn into_task(self) -> Result<Task, MaidError> {
        classify(self)
    }
}

impl<T: IntoTask> IntoTask for Option<T> {
    fn into_task(self) -> Result<Task, MaidError> {
        match self {
            Some(value) => value.into_task(),
            None => Err(MaidError::EmptyTask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskKind;

    struct Inert;
    impl Resource for Inert {}

    #[test]
    fn test_none_is_rejected() {
        let empty: Option<Task> = None;
        assert!(matches!(empty.into_task(), Err(MaidError::EmptyTask)));
    }

    #[test]
    fn test_some_is_unwrapped() {
        let task = Some(Task::call(|| {})).into_task().unwrap();
        assert_eq!(task.kind(), TaskKind::Callable);
    }

    #[test]
    fn test_token_and_maid_convert() {
        assert_eq!(
            CancellationToken::new().into_task().unwrap().kind(),
            TaskKind::Closeable
        );
        assert_eq!(Maid::new().into_task().unwrap().kind(), TaskKind::Nested);
    }

    #[test]
    fn test_default_type_name() {
        assert!(Inert.type_name().ends_with("Inert"));
    }
}
