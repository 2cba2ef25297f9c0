//! # Maid configuration.
//!
//! Provides [`Config`], plain settings consumed by [`MaidBuilder`](crate::MaidBuilder)
//! and [`MaidMap`](crate::MaidMap).
//!
//! ## Sentinel values
//! - `capacity = 0` → no preallocation of the task map

use std::borrow::Cow;

/// Per-maid configuration.
///
/// ## Field semantics
/// - `name`: label used in logs and events
/// - `catch_panics`: report panics as failures (`false` = re-raise the first one after the drain)
/// - `capacity`: initial task map capacity (`0` = none)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors over checking
/// sentinels directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name attached to every log line and event emitted by the maid.
    pub name: Cow<'static, str>,

    /// Whether a panic inside a disposal action is caught and reported.
    ///
    /// - `true`: the panic becomes [`TaskError::Panicked`](crate::TaskError::Panicked)
    ///   and the drain continues with the remaining tasks
    /// - `false`: every remaining task is still discharged, then the first panic
    ///   resumes unwinding out of `drain()`
    pub catch_panics: bool,

    /// Number of tasks to preallocate room for.
    pub capacity: usize,
}

impl Config {
    /// Returns the preallocation hint as an `Option`.
    ///
    /// - `None` → no preallocation
    /// - `Some(n)` → reserve room for `n` tasks
    #[inline]
    pub fn capacity_hint(&self) -> Option<usize> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.capacity)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "maid"`
    /// - `catch_panics = true`
    /// - `capacity = 0` (no preallocation)
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("maid"),
            catch_panics: true,
            capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.name, "maid");
        assert!(cfg.catch_panics);
        assert_eq!(cfg.capacity_hint(), None);
    }

    #[test]
    fn test_capacity_hint() {
        let cfg = Config {
            capacity: 8,
            ..Config::default()
        };
        assert_eq!(cfg.capacity_hint(), Some(8));
    }
}
