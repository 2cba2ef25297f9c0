//! # maid
//!
//! **Maid** is a deferred-disposal container for Rust.
//!
//! Code that acquires resources (listeners, spawned tasks, cancellation tokens,
//! child containers, plain closures) registers the matching cleanup obligation with
//! a [`Maid`]. One call to [`Maid::drain`] later discharges every obligation exactly
//! once, in insertion order, isolating failures from each other.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Callable   │   │  Disposable  │   │  Closeable   │   │ Nested(Maid) │
//!     │ (FnOnce)     │   │ (Disconnect) │   │ (JoinHandle, │   │ (child       │
//!     │              │   │              │   │  token, ...) │   │  container)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┴────── add ───────┴──────────────────┘
//!                                        ▼
//! ┌────────────────────────────────────────────────────────────────────────────┐
//! │  Maid (cheap-to-clone handle)                                              │
//! │  - Registry: IndexMap<TaskKey, Task> behind a mutex, Active | Cleaned      │
//! │  - optional Bus (broadcast events)                                         │
//! └──────┬───────────────────────────────┬──────────────────────────────┬──────┘
//!        ▼                               ▼                              ▼
//!   drain()/destroy()          bind(&dyn Lifecycle)              bind_token(token)
//!   last handle dropped        (signal fires ─► drain)           (cancel ─► drain)
//!        │
//!        ▼
//!   take all (one critical section) ─► discharge each outside the lock
//!        │                                   ├─ Ok  ─► TaskDischarged
//!        │                                   └─ Err ─► DischargeFailed ─► DischargeReport
//!        ▼
//! ┌────────────────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                             │
//! └───────────────────────────────────┬────────────────────────────────────────┘
//!                                     ▼
//!                          SubscriberSet::attach
//!                        ┌────────────┼────────────┐
//!                        ▼            ▼            ▼
//!                    LogWriter     sub2.on      subN.on
//!                                  _event()     _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Active ──drain()/destroy()/binding fired/last drop──► Cleaned (terminal)
//!
//! Active:  add ─► stored under a fresh TaskKey
//!          remove(key) ─► detached, returned, never discharged by the maid
//! Cleaned: add ─► discharged before add returns
//!          remove(key) ─► None
//!          drain ─► no-op
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                     |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------------------|
//! | **Container**     | Collect obligations, drain once, nest containers.            | [`Maid`], [`MaidBuilder`], [`Config`]                  |
//! | **Tasks**         | Typed obligations and the capabilities behind them.          | [`Task`], [`Invoke`], [`Disconnect`], [`Destroy`], [`Close`] |
//! | **Resources**     | Classify arbitrary objects by the capabilities they expose.  | [`Resource`], [`IntoTask`]                             |
//! | **Binding**       | Drain when an external lifetime ends.                        | [`Lifecycle`], [`Lifetime`]                            |
//! | **Keyed**         | One container per external key, removed when drained.        | [`MaidMap`]                                            |
//! | **Subscriber API**| Observe container activity (logging, metrics, custom).       | [`Bus`], [`Subscribe`], [`SubscriberSet`]              |
//! | **Errors**        | Typed errors for registration and discharge.                 | [`MaidError`], [`TaskError`], [`DischargeReport`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use maid::{Lifetime, Maid, Task};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Lifetime::new();
//!     let maid = Maid::builder().with_name("session").build();
//!
//!     // A background job, stopped through its token.
//!     let token = CancellationToken::new();
//!     let job = token.clone();
//!     let handle = tokio::spawn(async move { job.cancelled().await });
//!     maid.add(token)?;
//!     maid.add(handle)?;
//!
//!     // A plain closure.
//!     maid.add(Task::call(|| println!("session closed")))?;
//!
//!     // Everything above is discharged when the session ends.
//!     maid.bind(&session)?;
//!     session.terminate();
//!     assert!(maid.is_cleaned());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
pub mod tasks;

// ---- Public re-exports ----

pub use core::{Config, Lifecycle, Lifetime, Maid, MaidBuilder, MaidMap};
pub use error::{DischargeFailure, DischargeReport, MaidError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    Callback, Close, Destroy, Disconnect, IntoTask, Invoke, Resource, Task, TaskKey, TaskKind,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
