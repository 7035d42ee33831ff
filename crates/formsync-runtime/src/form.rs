//! Form - the state-owning unit bound to a UI layer
//!
//! A form owns the live field mapping and dirty flag, reconciles upstream
//! snapshot refreshes, and routes edits through the reducer. No public
//! operation fails: rejected edits are no-ops plus a diagnostic.

use std::fmt;

use formsync_core::{ChangeEvent, FieldMapping, FormError, FormResult};
use formsync_state::{
    dirty_after_refresh, reduce, Edit, EditContext, FieldState, PreserveLocalEdits, Reconcile,
    Transition,
};

use crate::{FormConfig, ResetTarget, SnapshotTracker};

type SubmitHandler = Box<dyn FnMut(&FieldMapping)>;

/// Operation counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormStats {
    pub changes: u64,
    pub toggles: u64,
    pub derivations: u64,
    pub rejected: u64,
    pub refreshes: u64,
    pub submits: u64,
}

/// Controlled form state
pub struct Form<R = PreserveLocalEdits> {
    /// Live field values tracking the upstream snapshot
    tracker: SnapshotTracker<FieldMapping, R>,
    /// Snapshot passed at construction
    initial: FieldMapping,
    dirty: bool,
    on_submit: SubmitHandler,
    config: FormConfig,
    stats: FormStats,
}

impl Form<PreserveLocalEdits> {
    /// Create a form from its first snapshot
    pub fn new(initial: FieldMapping, on_submit: impl FnMut(&FieldMapping) + 'static) -> Self {
        Self::with_config(initial, on_submit, FormConfig::default())
    }

    /// Create a form with custom configuration
    pub fn with_config(
        initial: FieldMapping,
        on_submit: impl FnMut(&FieldMapping) + 'static,
        config: FormConfig,
    ) -> Self {
        Self::with_reconciler(initial, on_submit, config, PreserveLocalEdits)
    }
}

impl<R: Reconcile<FieldMapping>> Form<R> {
    /// Create a form with a custom merge strategy for upstream refreshes
    pub fn with_reconciler(
        initial: FieldMapping,
        on_submit: impl FnMut(&FieldMapping) + 'static,
        config: FormConfig,
        reconciler: R,
    ) -> Self {
        Form {
            tracker: SnapshotTracker::new(initial.clone(), reconciler),
            initial,
            dirty: false,
            on_submit: Box::new(on_submit),
            config,
            stats: FormStats::default(),
        }
    }

    /// Current field values
    #[inline]
    pub fn data(&self) -> &FieldMapping {
        self.tracker.current()
    }

    /// Whether the form diverged from upstream
    #[inline]
    pub fn has_changed(&self) -> bool {
        self.dirty
    }

    /// Snapshot the form was constructed with
    pub fn initial(&self) -> &FieldMapping {
        &self.initial
    }

    /// Most recently reconciled snapshot
    pub fn snapshot(&self) -> &FieldMapping {
        self.tracker.snapshot()
    }

    pub fn stats(&self) -> &FormStats {
        &self.stats
    }

    /// Set a field from a UI event, running dependency rules.
    ///
    /// The form turns dirty when the new value differs from the stored one.
    /// Values are compared by content, so a fresh but equal sequence counts as
    /// unchanged. Unknown fields are logged at `error` level when
    /// `report_unknown_fields` is set.
    pub fn change(&mut self, event: ChangeEvent) {
        let (name, value) = event.into_parts();
        self.stats.changes += 1;

        match self.dispatch(Edit::Change { name, value }) {
            Ok(transition) if transition.derived => self.stats.derivations += 1,
            Ok(_) => {}
            Err(FormError::UnknownField(name)) => {
                self.stats.rejected += 1;
                if self.config.report_unknown_fields {
                    tracing::error!(field = %name, "Unknown form field");
                }
            }
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(error = %e, "change rejected");
            }
        }
    }

    /// [`change`](Self::change), then run `cb`
    pub fn change_then(&mut self, event: ChangeEvent, cb: impl FnOnce()) {
        self.change(event);
        cb();
    }

    /// Toggle a value in a collection field; non-collections are ignored
    pub fn toggle_value(&mut self, event: ChangeEvent) {
        let (name, value) = event.into_parts();
        self.stats.toggles += 1;

        if self.dispatch(Edit::Toggle { name, value }).is_err() {
            self.stats.rejected += 1;
        }
    }

    /// [`toggle_value`](Self::toggle_value), then run `cb`.
    ///
    /// `cb` runs whether or not the field was a collection.
    pub fn toggle_value_then(&mut self, event: ChangeEvent, cb: impl FnOnce()) {
        self.toggle_value(event);
        cb();
    }

    /// Restore the configured reset target
    pub fn reset(&mut self) {
        let target = match self.config.reset_target {
            ResetTarget::Construction => self.initial.clone(),
            ResetTarget::Latest => self.tracker.snapshot().clone(),
        };
        self.apply(Edit::Reset(target));
    }

    /// Shallow-merge recognized fields without touching the dirty flag
    pub fn set(&mut self, partial: FieldMapping) {
        if partial.is_empty() {
            return;
        }
        self.apply(Edit::Set(partial));
    }

    /// Hand the current values to the submit handler
    pub fn submit(&mut self) {
        self.stats.submits += 1;
        (self.on_submit)(self.tracker.current());
    }

    /// Mark the form as changed
    pub fn trigger_change(&mut self) {
        self.dirty = true;
    }

    /// Feed a new upstream snapshot.
    ///
    /// Returns `true` when the snapshot differed from the previous one and was
    /// reconciled into the form.
    pub fn refresh(&mut self, snapshot: FieldMapping) -> bool {
        let Some(refreshed) = self.tracker.refresh(snapshot) else {
            return false;
        };

        self.dirty = dirty_after_refresh(&refreshed.pre_merge, self.tracker.snapshot(), self.dirty);
        self.stats.refreshes += 1;
        tracing::debug!(dirty = self.dirty, "upstream snapshot refreshed");
        true
    }

    /// Run an edit that cannot be rejected
    fn apply(&mut self, edit: Edit) {
        if let Err(e) = self.dispatch(edit) {
            tracing::warn!(error = %e, "edit rejected");
        }
    }

    fn dispatch(&mut self, edit: Edit) -> FormResult<Transition> {
        let state = FieldState::new(self.tracker.current().clone()).with_dirty(self.dirty);
        let ctx = EditContext {
            rules: &self.config.rules,
        };
        let transition = reduce(&state, &edit, &ctx)?;

        for name in &transition.dropped {
            tracing::warn!(field = %name, "ignoring value for unknown field");
        }

        self.dirty = transition.state.is_dirty();
        self.tracker.set(transition.state.data().clone());
        Ok(transition)
    }
}

impl<R: Reconcile<FieldMapping>> fmt::Debug for Form<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("data", self.tracker.current())
            .field("dirty", &self.dirty)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
