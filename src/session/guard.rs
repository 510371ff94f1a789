//! Per node/direction in-flight guard
//!
//! At most one fetch runs per pair. The guard releases the pair when it is
//! dropped, including when the expanding future is cancelled.

use dashmap::DashSet;
use std::hash::Hash;

pub(super) struct InFlightGuard<'a, K: Eq + Hash> {
    set: &'a DashSet<K>,
    key: Option<K>,
}

impl<'a, K: Eq + Hash + Clone> InFlightGuard<'a, K> {
    /// Claim `key`, or `None` if someone else holds it
    pub(super) fn acquire(set: &'a DashSet<K>, key: K) -> Option<Self> {
        if set.insert(key.clone()) {
            Some(Self { set, key: Some(key) })
        } else {
            None
        }
    }
}

impl<K: Eq + Hash> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.set.remove(&key);
        }
    }
}
