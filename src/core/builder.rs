use std::borrow::Cow;

use crate::core::{config::Config, maid::Maid};
use crate::events::Bus;

/// Builder for constructing a [`Maid`] with a name, config and event bus.
///
/// ## Example
/// ```
/// use maid::{Bus, EventKind, Maid, Task};
///
/// let bus = Bus::new(64);
/// let mut rx = bus.subscribe();
///
/// let maid = Maid::builder().with_name("session").with_bus(bus).build();
/// maid.add(Task::call(|| {})).unwrap();
///
/// let ev = rx.try_recv().unwrap();
/// assert_eq!(ev.kind, EventKind::TaskAdded);
/// assert_eq!(ev.maid.as_deref(), Some("session"));
/// ```
pub struct MaidBuilder {
    cfg: Config,
    bus: Option<Bus>,
}

impl MaidBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg, bus: None }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the name used in logs and events.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cfg.name = name.into();
        self
    }

    /// Publishes this maid's events on `bus`.
    ///
    /// One bus may be shared by many maids; events carry the maid's name.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds an empty, active maid.
    pub fn build(self) -> Maid {
        Maid::from_parts(&self.cfg, self.bus)
    }
}
