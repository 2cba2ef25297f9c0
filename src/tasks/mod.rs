//! # Task abstractions and dispatch.
//!
//! This module provides the task-related types:
//! - [`Task`] - tagged union of cleanup obligations, with [`TaskKind`] and [`TaskKey`]
//! - [`Invoke`], [`Disconnect`], [`Destroy`], [`Close`] - capability contracts
//! - [`Resource`] - duck-typed capability inspection, and [`IntoTask`] conversion
//! - [`dispatch`] - classification (`classify`) and disposal (`discharge`)

mod capability;
pub mod dispatch;
mod resource;
mod task;

pub use capability::{Close, Destroy, Disconnect, Invoke};
pub use resource::{IntoTask, Resource};
pub use task::{Callback, Task, TaskKey, TaskKind};
