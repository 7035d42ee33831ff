//! Formsync Runtime - Form state holder and host integration
//!
//! This crate binds the state engine to a UI layer:
//! 1. Track upstream snapshots and reconcile them into local state
//! 2. Apply change and toggle events through the edit reducer
//! 3. Reset, bulk-set, force-dirty and submit
//! 4. Configure rule tables and reset behavior
//! 5. Install log output for a host application

pub mod config;
pub mod form;
pub mod logging;
pub mod tracker;

pub use config::*;
pub use form::*;
pub use logging::*;
pub use tracker::*;
