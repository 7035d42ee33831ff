//! Field dependency rules
//!
//! A rule table maps (field, value) triggers to pure derivations
//! `FieldMapping -> partial FieldMapping`. A single dispatcher evaluates every
//! rule whose trigger matches an edit and folds their patches together.
//!
//! The built-in table covers discount codes: selecting a code in `inputType`
//! looks the code up in the `array` field and copies the matching entry's
//! value into `discountValue`.

use std::fmt;
use std::sync::Arc;

use formsync_core::{FieldMapping, FieldValue};
use serde::{Deserialize, Serialize};

/// Selector field for the discount-code table
pub const DISCOUNT_SELECTOR: &str = "inputType";
/// Auxiliary sequence holding `{ key, value }` entries
pub const DISCOUNT_SOURCE: &str = "array";
/// Field receiving the looked-up value
pub const DISCOUNT_TARGET: &str = "discountValue";
/// Value used when no entry matches
pub const DISCOUNT_FALLBACK: &str = "0";

/// Codes that trigger a discount lookup
pub const DISCOUNT_CODES: [&str; 5] = [
    "DISCOUNT_CODE4000",
    "DISCOUNT_CODE4020",
    "DISCOUNT_CODE4022",
    "DISCOUNT_CODE4030",
    "DISCOUNT_CODE4040",
];

type Derivation = Arc<dyn Fn(&FieldMapping) -> Option<FieldMapping> + Send + Sync>;

/// One entry of the rule table
#[derive(Clone)]
pub struct DependencyRule {
    field: String,
    value: FieldValue,
    derive: Derivation,
}

impl DependencyRule {
    /// Create a rule firing when `field` is set to `value`.
    ///
    /// `derive` receives the state as it is before the edit and returns the
    /// fields to update, or `None` to skip.
    pub fn new(
        field: impl Into<String>,
        value: impl Into<FieldValue>,
        derive: impl Fn(&FieldMapping) -> Option<FieldMapping> + Send + Sync + 'static,
    ) -> Self {
        DependencyRule {
            field: field.into(),
            value: value.into(),
            derive: Arc::new(derive),
        }
    }

    #[inline]
    pub fn matches(&self, field: &str, value: &FieldValue) -> bool {
        self.field == field && &self.value == value
    }

    pub fn derive(&self, state: &FieldMapping) -> Option<FieldMapping> {
        (self.derive)(state)
    }
}

impl fmt::Debug for DependencyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRule")
            .field("field", &self.field)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Declarative lookup derivation.
///
/// When `selector` is set to one of `codes`, the first entry of the `source`
/// sequence whose `key_attr` equals the code provides `value_attr` for
/// `target`; without a match `target` gets `fallback`. The selector is
/// written in the same patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupRule {
    pub selector: String,
    pub codes: Vec<String>,
    pub source: String,
    pub key_attr: String,
    pub value_attr: String,
    pub target: String,
    pub fallback: FieldValue,
}

impl LookupRule {
    /// The discount-code table
    pub fn discount_codes() -> Self {
        LookupRule {
            selector: DISCOUNT_SELECTOR.to_string(),
            codes: DISCOUNT_CODES.iter().map(|c| c.to_string()).collect(),
            source: DISCOUNT_SOURCE.to_string(),
            key_attr: "key".to_string(),
            value_attr: "value".to_string(),
            target: DISCOUNT_TARGET.to_string(),
            fallback: FieldValue::String(DISCOUNT_FALLBACK.to_string()),
        }
    }

    /// Run the lookup for `code` against `state`.
    ///
    /// Returns `None` when the source field is undefined or not a sequence.
    pub fn lookup(&self, state: &FieldMapping, code: &str) -> Option<FieldMapping> {
        let entries = state.get(&self.source)?.as_array()?;

        // A null entry aborts the lookup, same as a missing source.
        if entries.iter().any(FieldValue::is_null) {
            return None;
        }

        let derived = entries
            .iter()
            .find(|entry| entry.get(&self.key_attr).and_then(FieldValue::as_str) == Some(code))
            .map(|entry| entry.get(&self.value_attr).cloned().unwrap_or(FieldValue::Null))
            .unwrap_or_else(|| self.fallback.clone());

        let mut patch = FieldMapping::new();
        patch.insert(self.target.clone(), derived);
        patch.insert(self.selector.clone(), FieldValue::String(code.to_string()));
        Some(patch)
    }

    /// Expand into one table entry per code
    pub fn to_rules(&self) -> Vec<DependencyRule> {
        self.codes
            .iter()
            .map(|code| {
                let rule = self.clone();
                let code_owned = code.clone();
                DependencyRule::new(self.selector.clone(), code.as_str(), move |state| {
                    rule.lookup(state, &code_owned)
                })
            })
            .collect()
    }
}

impl Default for LookupRule {
    fn default() -> Self {
        LookupRule::discount_codes()
    }
}

/// Rule table with a generic dispatcher
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<DependencyRule>,
}

impl RuleSet {
    /// Empty table
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Table with the discount-code lookups
    pub fn discount_codes() -> Self {
        RuleSet::from_lookups(&[LookupRule::discount_codes()])
    }

    pub fn from_lookups(lookups: &[LookupRule]) -> Self {
        RuleSet {
            rules: lookups.iter().flat_map(LookupRule::to_rules).collect(),
        }
    }

    pub fn push(&mut self, rule: DependencyRule) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: DependencyRule) -> Self {
        self.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule triggered by setting `field` to `value`.
    ///
    /// Patches are folded in table order, later rules winning per key.
    /// Returns `None` when no rule produced a patch.
    pub fn derive(
        &self,
        state: &FieldMapping,
        field: &str,
        value: &FieldValue,
    ) -> Option<FieldMapping> {
        let mut combined: Option<FieldMapping> = None;

        for rule in self.rules.iter().filter(|r| r.matches(field, value)) {
            let Some(patch) = rule.derive(state) else {
                tracing::trace!(field, "dependency rule skipped");
                continue;
            };
            let acc = combined.get_or_insert_with(FieldMapping::new);
            for (name, derived) in patch.iter() {
                acc.insert(name.clone(), derived.clone());
            }
        }

        combined
    }
}
