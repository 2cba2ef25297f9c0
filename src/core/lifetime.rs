//! # Lifetime: a ready-made one-shot termination signal.
//!
//! [`Lifetime`] implements [`Lifecycle`] for code that has no lifecycle signal of
//! its own. It terminates either explicitly ([`Lifetime::terminate`]) or when the
//! last clone is dropped.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use maid::{Lifetime, Maid, Task};
//!
//! let window = Lifetime::new();
//! let maid = Maid::new();
//! let closed = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&closed);
//!
//! maid.add(Task::call(move || flag.store(true, Ordering::SeqCst))).unwrap();
//! maid.bind(&window).unwrap();
//!
//! window.terminate();
//! assert!(closed.load(Ordering::SeqCst));
//! assert!(maid.is_cleaned());
//! ```

use std::mem;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::core::binding::Lifecycle;
use crate::error::TaskError;
use crate::tasks::Disconnect;

type Listener = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Listeners {
    terminated: bool,
    next_id: u64,
    callbacks: IndexMap<u64, Listener>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<Listeners>,
}

impl Inner {
    /// Flips to terminated and runs listeners outside the lock.
    fn terminate(&self) -> bool {
        let callbacks = {
            let mut state = self.state.lock();
            if state.terminated {
                return false;
            }
            state.terminated = true;
            mem::take(&mut state.callbacks)
        };
        for (_, callback) in callbacks {
            callback();
        }
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Cloneable, thread-safe one-shot termination signal.
#[derive(Clone, Default)]
pub struct Lifetime {
    inner: Arc<Inner>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminates the lifetime, firing every subscribed callback once.
    ///
    /// Returns `false` if it had already terminated.
    pub fn terminate(&self) -> bool {
        self.inner.terminate()
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.state.lock().terminated
    }

    /// Number of callbacks still waiting for termination.
    pub fn listeners(&self) -> usize {
        self.inner.state.lock().callbacks.len()
    }
}

impl Lifecycle for Lifetime {
    fn is_terminated(&self) -> bool {
        Lifetime::is_terminated(self)
    }

    fn on_terminated(&self, callback: Listener) -> Box<dyn Disconnect> {
        let mut state = self.inner.state.lock();
        if state.terminated {
            drop(state);
            callback();
            return Box::new(Subscription {
                lifetime: Weak::new(),
                id: 0,
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        state.callbacks.insert(id, callback);
        Box::new(Subscription {
            lifetime: Arc::downgrade(&self.inner),
            id,
        })
    }
}

/// Handle returned by [`Lifetime::on_terminated`].
struct Subscription {
    lifetime: Weak<Inner>,
    id: u64,
}

impl Disconnect for Subscription {
    fn disconnect(&self) -> Result<(), TaskError> {
        if let Some(inner) = self.lifetime.upgrade() {
            inner.state.lock().callbacks.shift_remove(&self.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Listener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        (
            hits,
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_terminate_fires_once() {
        let lifetime = Lifetime::new();
        let (hits, cb) = counter();
        let _sub = lifetime.on_terminated(cb);

        assert!(lifetime.terminate());
        assert!(!lifetime.terminate());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(lifetime.listeners(), 0);
    }

    #[test]
    fn test_disconnect_unsubscribes() {
        let lifetime = Lifetime::new();
        let (hits, cb) = counter();
        let sub = lifetime.on_terminated(cb);
        assert_eq!(lifetime.listeners(), 1);

        sub.disconnect().unwrap();
        sub.disconnect().unwrap();
        assert_eq!(lifetime.listeners(), 0);

        lifetime.terminate();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribe_after_terminate_fires_immediately() {
        let lifetime = Lifetime::new();
        lifetime.terminate();
        let (hits, cb) = counter();
        let sub = lifetime.on_terminated(cb);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        sub.disconnect().unwrap();
    }

    #[test]
    fn test_drop_of_last_clone_terminates() {
        let lifetime = Lifetime::new();
        let (hits, cb) = counter();
        let _sub = lifetime.on_terminated(cb);

        let clone = lifetime.clone();
        drop(lifetime);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        drop(clone);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
