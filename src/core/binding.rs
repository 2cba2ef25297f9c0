//! # Binding: drain a maid when an external lifetime ends.
//!
//! ## Flow
//! ```text
//! bind(lifecycle)
//!   ├─ already terminated? ──► BindingFired ──► drain() now
//!   └─ on_terminated(callback[weak maid]) ──► subscription
//!        ├─► insert(Task::Disposable(subscription))   (drained with everything else)
//!        └─ terminated meanwhile? ──► drain() now
//!
//! signal fires ──► callback ──► upgrade weak ──► BindingFired ──► drain()
//!                                                   └─► subscription.disconnect()
//! ```
//!
//! The callback holds only a weak reference: a binding never keeps a maid alive.

use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::registry::Registry;
use crate::error::MaidError;
use crate::events::{Event, EventKind};
use crate::tasks::{Disconnect, Task, TaskKey};

/// One-shot termination signal of an external object.
///
/// ## Contract
/// - `on_terminated` registers `callback` to run once when the object terminates and
///   returns a handle whose `disconnect` unsubscribes (idempotently).
/// - Implementations should invoke callbacks outside their own locks: a callback
///   drains a maid, which disconnects the very subscription being fired.
pub trait Lifecycle: Send + Sync {
    /// True once the object has terminated.
    fn is_terminated(&self) -> bool;

    /// Subscribes `callback` to the termination signal.
    fn on_terminated(&self, callback: Box<dyn FnOnce() + Send + 'static>)
    -> Box<dyn Disconnect>;
}

/// Binds `registry` to `lifecycle`; returns the subscription key, or `None` if the
/// lifecycle had already terminated and the maid was drained on the spot.
pub(crate) fn bind(
    registry: &Arc<Registry>,
    lifecycle: &dyn Lifecycle,
) -> Result<Option<TaskKey>, MaidError> {
    if lifecycle.is_terminated() {
        fire(registry)?;
        return Ok(None);
    }

    let weak = Arc::downgrade(registry);
    let subscription = lifecycle.on_terminated(Box::new(move || fire_detached(&weak)));
    let key = registry.insert(Task::Disposable(subscription))?;
    debug!(maid = %registry.name(), %key, "bound to external lifecycle");

    if lifecycle.is_terminated() && !registry.is_cleaned() {
        fire(registry)?;
    }
    Ok(Some(key))
}

/// Binds `registry` to a cancellation token via a watcher on the current runtime.
pub(crate) fn bind_token(
    registry: &Arc<Registry>,
    token: CancellationToken,
) -> Result<Option<TaskKey>, MaidError> {
    if token.is_cancelled() {
        fire(registry)?;
        return Ok(None);
    }

    let runtime = tokio::runtime::Handle::try_current().map_err(|_| MaidError::NoRuntime)?;
    let weak = Arc::downgrade(registry);
    let watcher = runtime.spawn(async move {
        token.cancelled().await;
        fire_detached(&weak);
    });

    let key = registry.insert(Task::close(watcher))?;
    debug!(maid = %registry.name(), %key, "bound to cancellation token");
    Ok(Some(key))
}

fn fire(registry: &Registry) -> Result<(), MaidError> {
    if registry.is_cleaned() {
        return Ok(());
    }
    registry.publish(|| Event::new(EventKind::BindingFired));
    registry.drain().map_err(MaidError::Discharge)
}

/// Drains from inside a signal callback, where failures can only be logged.
fn fire_detached(weak: &Weak<Registry>) {
    let Some(registry) = weak.upgrade() else {
        return;
    };
    if let Err(err) = fire(&registry) {
        warn!(maid = %registry.name(), error = %err, "binding-triggered drain failed");
    }
}
