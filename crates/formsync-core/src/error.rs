//! Error types for Formsync

use thiserror::Error;

/// Core Formsync errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    // Edit errors
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Field is not a collection: {0}")]
    NotACollection(String),

    // Construction errors
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Formsync operations
pub type FormResult<T> = Result<T, FormError>;
