//! # Capability contracts consumed by the dispatcher.
//!
//! Each trait is one structural requirement a collaborator can satisfy. The maid
//! never looks at concrete resource types, only at these capabilities.
//!
//! Implementations should be idempotent: a second `disconnect`/`destroy`/`close`
//! must be harmless. The maid itself calls each at most once per registration.
//!
//! Provided implementations:
//! - `Arc<T>` and `Box<T>` forward to `T` for every capability;
//! - [`Close`] for [`JoinHandle`], [`AbortHandle`] (abort; no-op once finished)
//!   and [`CancellationToken`] (cancel).

use std::sync::Arc;

use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Value that can be called as a zero-argument action.
///
/// Used for objects that behave like functions but are not closures.
pub trait Invoke: Send + Sync + 'static {
    fn invoke(&self) -> Result<(), TaskError>;
}

/// Subscription-like value.
pub trait Disconnect: Send + Sync + 'static {
    fn disconnect(&self) -> Result<(), TaskError>;
}

/// Owned object with an explicit teardown.
pub trait Destroy: Send + Sync + 'static {
    fn destroy(&self) -> Result<(), TaskError>;
}

/// Cooperative unit of work that is cancelled rather than awaited.
///
/// Closing a unit that already finished must be a no-op.
pub trait Close: Send + Sync + 'static {
    fn close(&self) -> Result<(), TaskError>;
}

macro_rules! forward_capability {
    ($cap:ident, $method:ident) => {
        impl<T: $cap + ?Sized> $cap for Arc<T> {
            fn $method(&self) -> Result<(), TaskError> {
                (**self).$method()
            }
        }

        impl<T: $cap + ?Sized> $cap for Box<T> {
            fn $method(&self) -> Result<(), TaskError> {
                (**self).$method()
            }
        }
    };
}

forward_capability!(Invoke, invoke);
forward_capability!(Disconnect, disconnect);
forward_capability!(Destroy, destroy);
forward_capability!(Close, close);

impl<T: Send + 'static> Close for JoinHandle<T> {
    fn close(&self) -> Result<(), TaskError> {
        self.abort();
        Ok(())
    }
}

impl Close for AbortHandle {
    fn close(&self) -> Result<(), TaskError> {
        self.abort();
        Ok(())
    }
}

impl Close for CancellationToken {
    fn close(&self) -> Result<(), TaskError> {
        self.cancel();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter(AtomicUsize);
    impl Destroy for Counter {
        fn destroy(&self) -> Result<(), TaskError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_arc_and_box_forward() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        Arc::clone(&counter).destroy().unwrap();
        let boxed: Box<dyn Destroy> = Box::new(Arc::clone(&counter));
        boxed.destroy().unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_token_close_is_idempotent() {
        let token = CancellationToken::new();
        token.close().unwrap();
        token.close().unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_join_handle_close_aborts() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        handle.close().unwrap();
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_close_on_finished_task_is_noop() {
        let handle = tokio::spawn(async { 7 });
        let abort = handle.abort_handle();
        assert_eq!(handle.await.unwrap(), 7);
        abort.close().unwrap();
        abort.close().unwrap();
    }
}
