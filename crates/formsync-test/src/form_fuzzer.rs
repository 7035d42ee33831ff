//! Form Fuzzer - Randomized edit and refresh sequences
//!
//! Tests:
//! - Key set stability across every operation
//! - Unknown-field edits leave the form untouched
//! - Submit purity
//! - Refresh idempotence for equal snapshots
//! - Dirty flag after diverging changes
//! - Discount derivation consistency

use std::cell::RefCell;
use std::rc::Rc;

use formsync_core::{ChangeEvent, FieldMapping, FieldValue};
use formsync_runtime::Form;
use formsync_state::{DISCOUNT_CODES, DISCOUNT_SELECTOR, DISCOUNT_SOURCE, DISCOUNT_TARGET};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const TAGS: &str = "tags";

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of plain scalar fields
    pub field_count: usize,
    /// Number of operations to run
    pub op_count: usize,
    /// Probability of an upstream refresh per step (0.0 - 1.0)
    pub refresh_prob: f64,
    /// Probability of editing an unknown field
    pub unknown_prob: f64,
    /// Probability of selecting a discount code
    pub code_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            field_count: 6,
            op_count: 1000,
            refresh_prob: 0.1,
            unknown_prob: 0.05,
            code_prob: 0.1,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            field_count: 3,
            op_count: 200,
            refresh_prob: 0.1,
            unknown_prob: 0.1,
            code_prob: 0.1,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            field_count: 20,
            op_count: 20000,
            refresh_prob: 0.2,
            unknown_prob: 0.05,
            code_prob: 0.2,
            seed: 42,
        }
    }
}

/// Invariant violation found during a run
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    KeySetChanged { step: usize },
    UnknownFieldApplied { step: usize },
    SubmitMutated { step: usize },
    SubmitHandlerMismatch { step: usize },
    EqualRefreshApplied { step: usize },
    ChangeNotDirty { step: usize },
    DerivationMismatch { step: usize },
}

/// Summary of a fuzz run
#[derive(Clone, Debug, Default)]
pub struct FuzzReport {
    pub operations: usize,
    pub refreshes: usize,
    pub derivations: u64,
    pub rejected: u64,
    pub violations: Vec<Violation>,
}

impl FuzzReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Drives one form through random operations
pub struct FormFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
    form: Form,
    upstream: FieldMapping,
    submitted: Rc<RefCell<Vec<FieldMapping>>>,
    report: FuzzReport,
}

impl FormFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let upstream = initial_mapping(&mut rng, config.field_count);

        let submitted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&submitted);
        let form = Form::new(upstream.clone(), move |data| {
            sink.borrow_mut().push(data.clone());
        });

        FormFuzzer {
            config,
            rng,
            form,
            upstream,
            submitted,
            report: FuzzReport::default(),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Run all configured operations
    pub fn run(mut self) -> FuzzReport {
        for step in 0..self.config.op_count {
            self.step(step);
        }

        self.report.operations = self.config.op_count;
        self.report.derivations = self.form.stats().derivations;
        self.report.rejected = self.form.stats().rejected;
        self.report
    }

    fn step(&mut self, step: usize) {
        let initial = self.form.initial().clone();

        if self.rng.gen_bool(self.config.refresh_prob) {
            self.refresh(step);
        } else if self.rng.gen_bool(self.config.unknown_prob) {
            self.unknown_change(step);
        } else if self.rng.gen_bool(self.config.code_prob) {
            self.select_code(step);
        } else {
            match self.rng.gen_range(0..7u8) {
                0 | 1 => self.change_scalar(step),
                2 => self.toggle_tag(),
                3 => self.toggle_scalar(),
                4 => self.bulk_set(),
                5 => self.submit(step),
                _ => {
                    if self.rng.gen_bool(0.5) {
                        self.form.reset();
                    } else {
                        self.form.trigger_change();
                    }
                }
            }
        }

        if !self.form.data().same_keys(&initial) {
            self.report.violations.push(Violation::KeySetChanged { step });
        }
    }

    fn scalar_name(&mut self) -> String {
        format!("f{}", self.rng.gen_range(0..self.config.field_count))
    }

    fn change_scalar(&mut self, step: usize) {
        let name = self.scalar_name();
        let value = json!(self.rng.gen_range(0..8i64));
        let differs = self.form.data().get(&name) != Some(&value);

        self.form.change(ChangeEvent::new(name.as_str(), value.clone()));

        if self.form.data().get(&name) != Some(&value) || (differs && !self.form.has_changed()) {
            self.report.violations.push(Violation::ChangeNotDirty { step });
        }
    }

    fn unknown_change(&mut self, step: usize) {
        let before = self.form.data().clone();
        let dirty = self.form.has_changed();

        let name = format!("unknown{}", self.rng.gen_range(0..4u32));
        self.form.change(ChangeEvent::new(name, 1));

        if self.form.data() != &before || self.form.has_changed() != dirty {
            self.report.violations.push(Violation::UnknownFieldApplied { step });
        }
    }

    fn select_code(&mut self, step: usize) {
        let code = DISCOUNT_CODES[self.rng.gen_range(0..DISCOUNT_CODES.len())];
        let expected = self
            .form
            .data()
            .get(DISCOUNT_SOURCE)
            .and_then(FieldValue::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .find(|e| e.get("key").and_then(FieldValue::as_str) == Some(code))
                    .and_then(|e| e.get("value").cloned())
                    .unwrap_or_else(|| json!("0"))
            });

        self.form.change(ChangeEvent::new(DISCOUNT_SELECTOR, code));

        let selected = self.form.data().get(DISCOUNT_SELECTOR) == Some(&json!(code));
        let derived = match expected {
            Some(value) => self.form.data().get(DISCOUNT_TARGET) == Some(&value),
            None => true,
        };
        if !selected || !derived {
            self.report.violations.push(Violation::DerivationMismatch { step });
        }
    }

    fn toggle_tag(&mut self) {
        let value = json!(self.rng.gen_range(0..5i64));
        self.form.toggle_value(ChangeEvent::new(TAGS, value));
    }

    fn toggle_scalar(&mut self) {
        let name = self.scalar_name();
        self.form.toggle_value(ChangeEvent::new(name, 1));
    }

    fn bulk_set(&mut self) {
        let mut partial = FieldMapping::new();
        for _ in 0..self.rng.gen_range(0..3usize) {
            let name = self.scalar_name();
            partial.insert(name, json!(self.rng.gen_range(0..8i64)));
        }
        self.form.set(partial);
    }

    fn submit(&mut self, step: usize) {
        let before = self.form.data().clone();
        let dirty = self.form.has_changed();
        let count = self.submitted.borrow().len();

        self.form.submit();

        if self.form.data() != &before || self.form.has_changed() != dirty {
            self.report.violations.push(Violation::SubmitMutated { step });
        }
        let submitted = self.submitted.borrow();
        if submitted.len() != count + 1 || submitted.last() != Some(&before) {
            self.report.violations.push(Violation::SubmitHandlerMismatch { step });
        }
    }

    fn refresh(&mut self, step: usize) {
        let name = self.scalar_name();
        self.upstream.insert(name, json!(self.rng.gen_range(0..8i64)));

        self.form.refresh(self.upstream.clone());
        self.report.refreshes += 1;

        let after = self.form.data().clone();
        let dirty = self.form.has_changed();
        if self.form.refresh(self.upstream.clone())
            || self.form.data() != &after
            || self.form.has_changed() != dirty
        {
            self.report.violations.push(Violation::EqualRefreshApplied { step });
        }
    }
}

fn initial_mapping(rng: &mut StdRng, field_count: usize) -> FieldMapping {
    let mut data = FieldMapping::new();
    for i in 0..field_count {
        data.insert(format!("f{i}"), json!(rng.gen_range(0..8i64)));
    }
    data.insert(TAGS, json!([0, 1]));

    // Only some codes get an entry so both match and fallback paths run.
    let mut entries = Vec::new();
    for code in DISCOUNT_CODES {
        if rng.gen_bool(0.5) {
            let value = rng.gen_range(1..50u32).to_string();
            entries.push(json!({ "key": code, "value": value }));
        }
    }
    data.insert(DISCOUNT_SOURCE, FieldValue::Array(entries));
    data.insert(DISCOUNT_SELECTOR, json!(""));
    data.insert(DISCOUNT_TARGET, json!(""));
    data
}
