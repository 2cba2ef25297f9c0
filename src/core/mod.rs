//! Container core: registry, facade and lifecycle binding.
//!
//! The public API from this module is [`Maid`] (with [`MaidBuilder`] and [`Config`]),
//! the binding contract [`Lifecycle`] with its ready-made [`Lifetime`], and the
//! keyed [`MaidMap`].
//!
//! Internal modules:
//! - [`registry`]: ordered task storage, terminal state, drain discipline;
//! - [`maid`]: thin public facade over a shared registry;
//! - [`binding`]: drain-on-termination subscriptions;
//! - [`lifetime`]: one-shot termination signal;
//! - [`keyed`]: one maid per external key.

mod binding;
mod builder;
mod config;
mod keyed;
mod lifetime;
mod maid;
mod registry;

pub use binding::Lifecycle;
pub use builder::MaidBuilder;
pub use config::Config;
pub use keyed::MaidMap;
pub use lifetime::Lifetime;
pub use maid::Maid;
