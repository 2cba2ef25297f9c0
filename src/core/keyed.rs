//! # MaidMap: one maid per external key.
//!
//! Applications often keep a maid per entity (player, connection, window). [`MaidMap`]
//! owns that mapping explicitly: entries are created on demand and disappear as soon
//! as their maid drains, whoever triggered the drain (the map, the owner, a binding).
//!
//! ## Rules
//! - Every maid created by the map carries a callable that removes its own entry,
//!   and only its own: a newer maid under the same key is left alone.
//! - Draining always happens outside the map lock.
//! - Dropping the map drops its handles; maids with no other handle drain on drop.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::binding::Lifecycle;
use crate::core::config::Config;
use crate::core::maid::Maid;
use crate::error::{DischargeReport, MaidError};
use crate::events::Bus;
use crate::tasks::Task;

/// Owned mapping from an external key to the maid that cleans up after it.
pub struct MaidMap<K> {
    maids: Arc<Mutex<HashMap<K, Maid>>>,
    cfg: Config,
    bus: Option<Bus>,
}

impl<K> MaidMap<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Maids created by this map use `cfg`.
    pub fn with_config(cfg: Config) -> Self {
        Self {
            maids: Arc::new(Mutex::new(HashMap::new())),
            cfg,
            bus: None,
        }
    }

    /// Maids created by this map publish on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Returns the live maid for `key`, creating it if needed.
    pub fn get_or_insert(&self, key: K) -> Result<Maid, MaidError> {
        let mut maids = self.maids.lock();
        if let Some(maid) = maids.get(&key) {
            if !maid.is_cleaned() {
                return Ok(maid.clone());
            }
        }

        let maid = Maid::from_parts(&self.cfg, self.bus.clone());
        let me = maid.downgrade();
        let map = Arc::downgrade(&self.maids);
        let entry = key.clone();
        maid.add(Task::call(move || {
            let Some(map) = map.upgrade() else {
                return;
            };
            let removed = {
                let mut maids = map.lock();
                match maids.get(&entry) {
                    Some(current) if current.is(&me) => maids.remove(&entry),
                    _ => None,
                }
            };
            drop(removed);
        }))?;

        // A cleaned leftover is replaced; dropping it outside the lock.
        let stale = maids.insert(key, maid.clone());
        drop(maids);
        drop(stale);
        Ok(maid)
    }

    pub fn get(&self, key: &K) -> Option<Maid> {
        self.maids.lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.maids.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.maids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maids.lock().is_empty()
    }

    /// Detaches the entry for `key` and drains its maid. Absent keys are a no-op.
    pub fn remove(&self, key: &K) -> Result<(), DischargeReport> {
        let removed = self.maids.lock().remove(key);
        match removed {
            Some(maid) => maid.drain(),
            None => Ok(()),
        }
    }

    /// Drains the maid for `key` when `lifecycle` terminates; the entry goes with it.
    pub fn bind(&self, key: K, lifecycle: &dyn Lifecycle) -> Result<Maid, MaidError> {
        let maid = self.get_or_insert(key)?;
        maid.bind(lifecycle)?;
        Ok(maid)
    }

    /// Drains every entry (in no particular order), collecting all failures.
    pub fn drain_all(&self) -> Result<(), DischargeReport> {
        let maids = mem::take(&mut *self.maids.lock());
        let mut report = DischargeReport::new();
        for (_, maid) in maids {
            if let Err(failures) = maid.drain() {
                report.merge(failures);
            }
        }
        report.into_result()
    }
}

impl<K> Default for MaidMap<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
