//! Upstream snapshot tracking
//!
//! A tracker holds a locally owned value derived from an upstream snapshot.
//! Protocol: on every new snapshot that is not deep-equal to the previous one,
//! the injected reconciler is invoked synchronously with
//! `(previous snapshot, current value, new snapshot)` and its result becomes
//! the current value.

use std::mem;

use formsync_state::Reconcile;

/// Outcome of a refresh that ran the reconciler
#[derive(Clone, Debug, PartialEq)]
pub struct Refreshed<T> {
    /// Snapshot that was replaced
    pub previous_snapshot: T,
    /// Current value as it was before the merge
    pub pre_merge: T,
}

/// Local value tracking a changing upstream snapshot
#[derive(Debug)]
pub struct SnapshotTracker<T, R> {
    snapshot: T,
    current: T,
    reconciler: R,
    refreshes: u64,
}

impl<T, R> SnapshotTracker<T, R>
where
    T: Clone + PartialEq,
    R: Reconcile<T>,
{
    /// Start tracking; the first snapshot is also the initial value
    pub fn new(initial: T, reconciler: R) -> Self {
        SnapshotTracker {
            snapshot: initial.clone(),
            current: initial,
            reconciler,
            refreshes: 0,
        }
    }

    /// Current local value
    #[inline]
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Most recent upstream snapshot
    #[inline]
    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Number of refreshes that ran the reconciler
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Replace the current value
    pub fn set(&mut self, value: T) {
        self.current = value;
    }

    /// Derive the current value from itself
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        self.current = f(&self.current);
    }

    /// Feed a new upstream snapshot.
    ///
    /// Returns `None` when the snapshot is deep-equal to the previous one.
    pub fn refresh(&mut self, next: T) -> Option<Refreshed<T>> {
        if next == self.snapshot {
            return None;
        }

        let merged = self
            .reconciler
            .reconcile(&self.snapshot, &self.current, &next);
        let pre_merge = mem::replace(&mut self.current, merged);
        let previous_snapshot = mem::replace(&mut self.snapshot, next);
        self.refreshes += 1;

        Some(Refreshed {
            previous_snapshot,
            pre_merge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsync_core::FieldMapping;
    use formsync_state::PreserveLocalEdits;
    use serde_json::{json, Value};

    fn mapping(value: Value) -> FieldMapping {
        FieldMapping::from_value(value).unwrap()
    }

    #[test]
    fn test_refresh_runs_reconciler() {
        let mut tracker = SnapshotTracker::new(mapping(json!({ "a": 1, "b": 2 })), PreserveLocalEdits);
        tracker.update(|data| {
            let mut next = data.clone();
            next.insert("b", json!(9));
            next
        });

        let refreshed = tracker.refresh(mapping(json!({ "a": 5, "b": 2 }))).unwrap();

        assert_eq!(tracker.current(), &mapping(json!({ "a": 5, "b": 9 })));
        assert_eq!(tracker.snapshot(), &mapping(json!({ "a": 5, "b": 2 })));
        assert_eq!(refreshed.pre_merge, mapping(json!({ "a": 1, "b": 9 })));
        assert_eq!(refreshed.previous_snapshot, mapping(json!({ "a": 1, "b": 2 })));
        assert_eq!(tracker.refreshes(), 1);
    }

    #[test]
    fn test_equal_snapshot_is_ignored() {
        let mut tracker = SnapshotTracker::new(mapping(json!({ "a": 1 })), PreserveLocalEdits);
        tracker.set(mapping(json!({ "a": 3 })));

        assert!(tracker.refresh(mapping(json!({ "a": 1 }))).is_none());
        assert_eq!(tracker.current(), &mapping(json!({ "a": 3 })));
        assert_eq!(tracker.refreshes(), 0);
    }

    #[test]
    fn test_injected_reconciler_receives_protocol_arguments() {
        let calls = std::cell::RefCell::new(Vec::new());
        let recording = |prev: &i32, current: &i32, next: &i32| {
            calls.borrow_mut().push((*prev, *current, *next));
            current + next
        };

        let mut tracker = SnapshotTracker::new(1, recording);
        tracker.set(10);
        tracker.refresh(2);
        tracker.refresh(2);
        tracker.refresh(5);

        assert_eq!(*tracker.current(), 17);
        assert_eq!(calls.borrow().as_slice(), &[(1, 10, 2), (2, 12, 5)]);
    }
}
