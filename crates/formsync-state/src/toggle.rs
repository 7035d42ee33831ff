//! Collection membership toggle
//!
//! Used by multi-select fields: a value present in the collection is removed,
//! an absent one is appended at the end.

use formsync_core::FieldValue;

/// Toggle `value` in `list` under the supplied equality.
///
/// Every element equal to `value` is removed. When none is found, `value` is
/// appended. Remaining elements keep their order.
pub fn toggle<T, F>(value: &T, list: &[T], eq: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    if list.iter().any(|item| eq(item, value)) {
        list.iter().filter(|item| !eq(*item, value)).cloned().collect()
    } else {
        let mut next = Vec::with_capacity(list.len() + 1);
        next.extend_from_slice(list);
        next.push(value.clone());
        next
    }
}

/// Toggle a JSON value in a JSON sequence using deep equality
pub fn toggle_value(value: &FieldValue, list: &[FieldValue]) -> Vec<FieldValue> {
    toggle(value, list, |a, b| a == b)
}
