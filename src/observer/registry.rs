// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer registry.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::DeviceState;

use super::Observer;

/// Unique identifier for a registration.
///
/// Returned by [`ObserverRegistry::subscribe`] and accepted by
/// [`ObserverRegistry::unsubscribe`]. IDs are unique within a registry's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// A registered observer.
struct Entry {
    id: SubscriptionId,
    observer: Arc<dyn Observer>,
}

/// Returns the data address of an observer, ignoring its vtable.
fn address(observer: &Arc<dyn Observer>) -> *const () {
    Arc::as_ptr(observer).cast::<()>()
}

/// Thread-safe set of registered observers.
///
/// Registration is idempotent and keyed on the observer's identity (the
/// allocation behind its `Arc`), so registering the same observer twice
/// returns the original [`SubscriptionId`]. Removing an unknown observer is
/// a no-op.
pub struct ObserverRegistry {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Registers an observer.
    ///
    /// Returns the existing ID if the observer is already registered.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let mut entries = self.entries.write();
        if let Some(entry) = entries
            .iter()
            .find(|e| address(&e.observer) == address(&observer))
        {
            return entry.id;
        }

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entries.push(Entry { id, observer });
        id
    }

    /// Removes a registration by ID.
    ///
    /// Returns `true` if a registration was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Removes a registration by observer identity.
    ///
    /// Returns `true` if the observer was registered.
    pub fn unsubscribe_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| address(&e.observer) != address(observer));
        entries.len() != before
    }

    /// Returns `true` if the observer is registered.
    #[must_use]
    pub fn contains(&self, observer: &Arc<dyn Observer>) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| address(&e.observer) == address(observer))
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Delivers a snapshot to every observer registered right now.
    ///
    /// The list is copied before dispatch, so an observer may (un)subscribe
    /// from inside its callback without deadlocking. Returns the number of
    /// observers notified.
    pub fn notify(&self, state: &DeviceState) -> usize {
        let observers: Vec<Arc<dyn Observer>> = self
            .entries
            .read()
            .iter()
            .map(|e| Arc::clone(&e.observer))
            .collect();

        for observer in &observers {
            observer.on_state_changed(state);
        }
        observers.len()
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
    }

    impl Observer for Counter {
        fn on_state_changed(&self, _state: &DeviceState) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn counter() -> (Arc<Counter>, Arc<dyn Observer>) {
        let concrete = Arc::new(Counter::default());
        let erased: Arc<dyn Observer> = concrete.clone();
        (concrete, erased)
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = ObserverRegistry::new();
        let (_, observer) = counter();

        let first = registry.subscribe(Arc::clone(&observer));
        let second = registry.subscribe(Arc::clone(&observer));

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_observers_get_distinct_ids() {
        let registry = ObserverRegistry::new();
        let (_, a) = counter();
        let (_, b) = counter();

        assert_ne!(registry.subscribe(a), registry.subscribe(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let registry = ObserverRegistry::new();
        let (_, observer) = counter();
        let id = registry.subscribe(Arc::clone(&observer));

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(!registry.unsubscribe_observer(&observer));
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_by_identity() {
        let registry = ObserverRegistry::new();
        let (_, observer) = counter();
        registry.subscribe(Arc::clone(&observer));

        assert!(registry.contains(&observer));
        assert!(registry.unsubscribe_observer(&observer));
        assert!(!registry.contains(&observer));
    }

    #[test]
    fn notify_reaches_every_observer_once() {
        let registry = ObserverRegistry::new();
        let (a, a_dyn) = counter();
        let (b, b_dyn) = counter();
        registry.subscribe(a_dyn);
        registry.subscribe(b_dyn);

        let notified = registry.notify(&DeviceState::new());

        assert_eq!(notified, 2);
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let registry = ObserverRegistry::new();
        let (_, observer) = counter();
        registry.subscribe(observer);
        registry.clear();
        assert_eq!(registry.notify(&DeviceState::new()), 0);
    }

    #[test]
    fn subscription_id_display() {
        let registry = ObserverRegistry::new();
        let (_, observer) = counter();
        let id = registry.subscribe(observer);
        assert_eq!(id.to_string(), format!("Sub({})", id.value()));
    }
}
