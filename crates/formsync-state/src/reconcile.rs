//! Snapshot reconciliation
//!
//! When upstream initial data is refreshed, each field either keeps its local
//! value or adopts the fresh upstream value:
//!
//! - upstream value unchanged between the two snapshots: keep the local value
//!   (a pending edit survives)
//! - upstream value changed: adopt it (the fresher external value wins)
//!
//! Only fields already present in the local mapping are considered, so the
//! key set never changes through reconciliation.

use formsync_core::{FieldMapping, FieldValue};

/// Merge strategy invoked on every upstream refresh
pub trait Reconcile<T> {
    /// Compute the new local state from the previous snapshot, the current
    /// local state and the incoming snapshot.
    fn reconcile(&self, prev_snapshot: &T, current: &T, next_snapshot: &T) -> T;
}

impl<T, F> Reconcile<T> for F
where
    F: Fn(&T, &T, &T) -> T,
{
    fn reconcile(&self, prev_snapshot: &T, current: &T, next_snapshot: &T) -> T {
        self(prev_snapshot, current, next_snapshot)
    }
}

/// Reconciliation result for one refresh
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Fields whose local value was kept
    pub retained: u32,
    /// Fields that took the upstream value
    pub adopted: u32,
}

/// Default strategy: keep local edits unless upstream changed the field
#[derive(Debug, Default, Clone, Copy)]
pub struct PreserveLocalEdits;

impl PreserveLocalEdits {
    /// Merge `next_snapshot` into `current` and report what happened
    pub fn merge(
        &self,
        prev_snapshot: &FieldMapping,
        current: &FieldMapping,
        next_snapshot: &FieldMapping,
    ) -> (FieldMapping, ReconcileReport) {
        let mut report = ReconcileReport::default();
        let mut merged = current.clone();

        for name in current.keys() {
            if next_snapshot.field_eq(prev_snapshot, name) {
                report.retained += 1;
                continue;
            }

            // Undefined upstream is stored as null; the key stays.
            let adopted = next_snapshot.get(name).cloned().unwrap_or(FieldValue::Null);
            merged.insert(name.clone(), adopted);
            report.adopted += 1;
        }

        (merged, report)
    }
}

impl Reconcile<FieldMapping> for PreserveLocalEdits {
    fn reconcile(
        &self,
        prev_snapshot: &FieldMapping,
        current: &FieldMapping,
        next_snapshot: &FieldMapping,
    ) -> FieldMapping {
        let (merged, report) = self.merge(prev_snapshot, current, next_snapshot);
        tracing::debug!(
            retained = report.retained,
            adopted = report.adopted,
            "snapshot reconciled"
        );
        merged
    }
}

/// Dirty flag after a refresh.
///
/// Compares the state as it was *before* the merge with the incoming
/// snapshot; only a match clears the flag. The flag can lag one refresh
/// behind the merged state.
pub fn dirty_after_refresh(
    pre_merge: &FieldMapping,
    next_snapshot: &FieldMapping,
    dirty: bool,
) -> bool {
    if pre_merge == next_snapshot {
        false
    } else {
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn mapping(value: Value) -> FieldMapping {
        FieldMapping::from_value(value).unwrap()
    }

    #[test]
    fn test_merge_preserves_local_edits() {
        let prev = mapping(json!({ "a": 1, "b": 2 }));
        let current = mapping(json!({ "a": 1, "b": 9 }));
        let next = mapping(json!({ "a": 5, "b": 2 }));

        let (merged, report) = PreserveLocalEdits.merge(&prev, &current, &next);

        assert_eq!(merged, mapping(json!({ "a": 5, "b": 9 })));
        assert_eq!(report, ReconcileReport { retained: 1, adopted: 1 });
    }

    #[test]
    fn test_merge_upstream_overrides_edit_on_same_field() {
        let prev = mapping(json!({ "a": 1 }));
        let current = mapping(json!({ "a": 7 }));
        let next = mapping(json!({ "a": 3 }));

        let merged = PreserveLocalEdits.reconcile(&prev, &current, &next);
        assert_eq!(merged, mapping(json!({ "a": 3 })));
    }

    #[test]
    fn test_merge_ignores_new_upstream_keys() {
        let prev = mapping(json!({ "a": 1 }));
        let current = mapping(json!({ "a": 1 }));
        let next = mapping(json!({ "a": 1, "extra": true }));

        let merged = PreserveLocalEdits.reconcile(&prev, &current, &next);
        assert_eq!(merged, mapping(json!({ "a": 1 })));
    }

    #[test]
    fn test_merge_missing_upstream_key_becomes_null() {
        let prev = mapping(json!({ "a": 1, "b": 2 }));
        let current = mapping(json!({ "a": 1, "b": 2 }));
        let next = mapping(json!({ "a": 1 }));

        let merged = PreserveLocalEdits.reconcile(&prev, &current, &next);
        assert_eq!(merged, mapping(json!({ "a": 1, "b": null })));
    }

    #[test]
    fn test_merge_compares_nested_values_deeply() {
        let prev = mapping(json!({ "tags": [{ "id": 1 }], "note": "x" }));
        let current = mapping(json!({ "tags": [], "note": "x" }));
        let next = mapping(json!({ "tags": [{ "id": 1 }], "note": "y" }));

        let merged = PreserveLocalEdits.reconcile(&prev, &current, &next);
        assert_eq!(merged, mapping(json!({ "tags": [], "note": "y" })));
    }

    #[test]
    fn test_closure_strategy() {
        let take_next = |_: &FieldMapping, _: &FieldMapping, next: &FieldMapping| next.clone();
        let next = mapping(json!({ "a": 2 }));

        let merged = take_next.reconcile(&FieldMapping::new(), &FieldMapping::new(), &next);
        assert_eq!(merged, next);
    }

    #[test]
    fn test_dirty_after_refresh_uses_pre_merge_state() {
        let pre = mapping(json!({ "a": 1 }));

        assert!(!dirty_after_refresh(&pre, &mapping(json!({ "a": 1 })), true));
        assert!(dirty_after_refresh(&pre, &mapping(json!({ "a": 2 })), true));
        assert!(!dirty_after_refresh(&pre, &mapping(json!({ "a": 2 })), false));
    }

    mod props {
        use super::*;
        use proptest::collection::btree_map;
        use proptest::prelude::*;

        fn to_mapping(m: std::collections::BTreeMap<String, i64>) -> FieldMapping {
            m.into_iter().map(|(k, v)| (k, json!(v))).collect()
        }

        proptest! {
            #[test]
            fn unchanged_snapshot_keeps_state(
                snap in btree_map("[a-d]", 0i64..4, 0..4),
                state in btree_map("[a-d]", 0i64..4, 0..4),
            ) {
                let snap = to_mapping(snap);
                let state = to_mapping(state);

                let merged = PreserveLocalEdits.reconcile(&snap, &state, &snap);
                prop_assert_eq!(merged, state);
            }

            #[test]
            fn clean_state_follows_upstream(
                prev in btree_map("[a-d]", 0i64..4, 1..4),
                next in prop::collection::vec(0i64..4, 4),
            ) {
                let prev = to_mapping(prev);
                let next: FieldMapping = prev
                    .keys()
                    .zip(next)
                    .map(|(k, v)| (k.clone(), json!(v)))
                    .collect();

                let merged = PreserveLocalEdits.reconcile(&prev, &prev, &next);
                prop_assert_eq!(merged, next);
            }

            #[test]
            fn merge_never_changes_key_set(
                prev in btree_map("[a-f]", 0i64..3, 0..6),
                state in btree_map("[a-f]", 0i64..3, 0..6),
                next in btree_map("[a-f]", 0i64..3, 0..6),
            ) {
                let state = to_mapping(state);
                let merged = PreserveLocalEdits.reconcile(&to_mapping(prev), &state, &to_mapping(next));
                prop_assert!(merged.same_keys(&state));
            }
        }
    }
}
