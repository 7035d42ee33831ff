//! Formsync Core - Fundamental types for controlled form state
//!
//! This crate defines the types shared by every Formsync crate:
//! - Field mappings (name → JSON value)
//! - Change events as dispatched by a UI layer
//! - Error taxonomy

pub mod error;
pub mod event;
pub mod mapping;

pub use error::*;
pub use event::*;
pub use mapping::*;
