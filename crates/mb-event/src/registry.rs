//! Identity Registry
//!
//! Maps route keys to the live instances that own them so a callback arriving
//! on a native thread can find its target. Entries are `Weak`: the registry
//! never keeps an instance alive.
//!
//! `Arc`s are never upgraded while the map lock is held. An upgraded `Arc`
//! dropped under the lock could run the instance's `Drop`, which releases its
//! own entries and would deadlock on the same lock.

use mb_core::RouteKey;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Non-owning route key → instance table
pub struct IdentityRegistry<T> {
    entries: RwLock<HashMap<RouteKey, Weak<T>>>,
}

impl<T> IdentityRegistry<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Record `instance` as the owner of `key`.
    ///
    /// Refuses (and logs) when a different live instance already owns the key,
    /// which points at handle reuse on the native side. Entries whose owner has
    /// been dropped are replaced.
    pub fn track(&self, key: RouteKey, instance: &Arc<T>) -> bool {
        self.track_weak(key, Arc::downgrade(instance))
    }

    /// Same as [`track`](Self::track) for callers holding only a `Weak`
    pub fn track_weak(&self, key: RouteKey, instance: Weak<T>) -> bool {
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&key) {
            if Weak::ptr_eq(existing, &instance) {
                return true;
            }
            if existing.strong_count() > 0 {
                log::error!(
                    "registry: {} is already tracked by another live instance, keeping the original",
                    key
                );
                return false;
            }
            log::debug!("registry: replacing stale entry for {}", key);
        }

        entries.insert(key, instance);
        true
    }

    /// Currently tracked live instance for `key`
    pub fn resolve(&self, key: &RouteKey) -> Option<Arc<T>> {
        let weak = self.entries.read().get(key).cloned()?;
        weak.upgrade()
    }

    /// Remove the entry for `key` whoever owns it. No-op when untracked.
    ///
    /// Instances release their own routes through [`release_if_owner`] so a
    /// key re-tracked by a newer owner survives; this is for hosts dropping a
    /// route outright.
    ///
    /// [`release_if_owner`]: Self::release_if_owner
    pub fn release(&self, key: &RouteKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Remove the entry for `key` only if `owner` is the tracked instance.
    ///
    /// Works during `owner`'s `Drop`, when no `Arc` to it can be formed.
    pub fn release_if_owner(&self, key: &RouteKey, owner: &T) -> bool {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(existing) if std::ptr::eq(existing.as_ptr(), owner) => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// True if `key` has an entry whose owner is still alive
    pub fn contains(&self, key: &RouteKey) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|w| w.strong_count() > 0)
    }

    /// Drop entries whose owners are gone, returning how many were removed
    pub fn purge_dead(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, w| w.strong_count() > 0);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T> Default for IdentityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
