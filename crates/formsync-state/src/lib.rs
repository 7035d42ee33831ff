//! Formsync State Engine - Field state, reconciliation and edit reduction
//!
//! This crate implements the state-side logic of a controlled form:
//! - Field state with a dirty flag
//! - Snapshot reconciliation that keeps local edits
//! - Field dependency rules
//! - Collection membership toggles

pub mod field;
pub mod reconcile;
pub mod rules;
pub mod toggle;

pub use field::*;
pub use reconcile::*;
pub use rules::*;
pub use toggle::*;
