//! Formsync Test Harness - Randomized form exercising
//!
//! This crate provides:
//! - Seeded random edit and refresh sequences
//! - Invariant checks after every operation
//! - Fuzz presets (light, default, heavy)

pub mod form_fuzzer;

pub use form_fuzzer::*;
