//! Set of keys with a flush in flight
//!
//! A key is present from its first arrival until its scheduled flush
//! removes it. Every operation takes the same lock, so no caller can see
//! a half-applied insert or removal.

use parking_lot::Mutex;
use projrelay_core::ChangeKey;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct PendingSet {
    keys: Mutex<HashSet<ChangeKey>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `key`, returning whether it was pending
    pub fn try_remove(&self, key: &ChangeKey) -> bool {
        self.keys.lock().remove(key)
    }

    /// Mark `key` pending, returning false if it already was
    ///
    /// The debouncer relies on this single atomic check-and-insert to
    /// decide whether a new timer is needed.
    pub fn insert(&self, key: ChangeKey) -> bool {
        self.keys.lock().insert(key)
    }

    pub fn contains(&self, key: &ChangeKey) -> bool {
        self.keys.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}
