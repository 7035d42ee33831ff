//! Field state and the edit reducer
//!
//! Every edit is applied by one pure step `(FieldState, Edit) -> FieldState`.
//! Derived fields and the edited field land in the same step, so there is no
//! intermediate state for an observer (or a batching scheduler) to see.

use formsync_core::{FieldMapping, FieldValue, FormError, FormResult};

use crate::{toggle_value, RuleSet};

/// Field values plus the dirty flag
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldState {
    data: FieldMapping,
    dirty: bool,
}

/// A single edit
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Set one field, running dependency rules
    Change { name: String, value: FieldValue },
    /// Add or remove a value in a collection field
    Toggle { name: String, value: FieldValue },
    /// Shallow-merge recognized fields; dirty flag untouched
    Set(FieldMapping),
    /// Replace every field from the given data; clean when it matches
    Reset(FieldMapping),
    /// Force the dirty flag
    MarkDirty,
}

/// What the reducer reads besides the state itself
#[derive(Clone, Copy, Debug)]
pub struct EditContext<'a> {
    /// Dependency rule table
    pub rules: &'a RuleSet,
}

/// Result of a successful reducer step
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: FieldState,
    /// Names in a patch that are not fields of this form
    pub dropped: Vec<String>,
    /// Whether a dependency rule contributed to the step
    pub derived: bool,
}

impl FieldState {
    pub fn new(data: FieldMapping) -> Self {
        FieldState { data, dirty: false }
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    #[inline]
    pub fn data(&self) -> &FieldMapping {
        &self.data
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

}

impl Transition {
    fn plain(state: FieldState) -> Self {
        Transition {
            state,
            dropped: Vec::new(),
            derived: false,
        }
    }
}

/// Apply one edit to `state`.
///
/// Fails without producing a state when the edit targets an unknown field
/// (`Change`) or a field that is not a sequence (`Toggle`).
pub fn reduce(state: &FieldState, edit: &Edit, ctx: &EditContext<'_>) -> FormResult<Transition> {
    match edit {
        Edit::Change { name, value } => change(state, name, value, ctx.rules),
        Edit::Toggle { name, value } => {
            let Some(items) = state.data.get(name).and_then(FieldValue::as_array) else {
                return Err(FormError::NotACollection(name.clone()));
            };
            let toggled = toggle_value(value, items);

            let mut data = state.data.clone();
            data.insert(name.clone(), FieldValue::Array(toggled));
            Ok(Transition::plain(FieldState { data, dirty: true }))
        }
        Edit::Set(partial) => {
            let mut data = state.data.clone();
            let dropped = data.patch_known(partial);
            Ok(Transition {
                state: FieldState {
                    data,
                    dirty: state.dirty,
                },
                dropped,
                derived: false,
            })
        }
        Edit::Reset(target) => {
            // Keep the current key set; fields the target lacks become null.
            let data: FieldMapping = state
                .data
                .keys()
                .map(|name| {
                    let value = target.get(name).cloned().unwrap_or(FieldValue::Null);
                    (name.clone(), value)
                })
                .collect();
            let dirty = data != *target;
            Ok(Transition::plain(FieldState { data, dirty }))
        }
        Edit::MarkDirty => Ok(Transition::plain(FieldState {
            data: state.data.clone(),
            dirty: true,
        })),
    }
}

/// Field values are owned, so "changed" means value inequality. Re-sending a
/// deep-equal sequence or object leaves a clean state clean.
fn change(
    state: &FieldState,
    name: &str,
    value: &FieldValue,
    rules: &RuleSet,
) -> FormResult<Transition> {
    let Some(current) = state.data.get(name) else {
        return Err(FormError::UnknownField(name.to_string()));
    };
    let dirty = state.dirty || current != value;

    let derived = rules.derive(&state.data, name, value);
    let is_derived = derived.is_some();

    // The plain field-set is applied last so it always survives.
    let mut patch = derived.unwrap_or_default();
    patch.insert(name, value.clone());

    let mut data = state.data.clone();
    let dropped = data.patch_known(&patch);

    Ok(Transition {
        state: FieldState { data, dirty },
        dropped,
        derived: is_derived,
    })
}
