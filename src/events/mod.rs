//! Maid events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: every maid built with [`MaidBuilder::with_bus`](crate::MaidBuilder::with_bus).
//! - **Consumers**: [`SubscriberSet::attach`](crate::SubscriberSet::attach) or any
//!   receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
