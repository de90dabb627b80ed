//! Validation error types for SpotGrid inputs.

use thiserror::Error;

/// Result type alias for input validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised when a catalog offering, service, or weight set is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("instance {id}: {reason}")]
    Instance { id: String, reason: String },

    #[error("service {name}: {reason}")]
    Service { name: String, reason: String },

    #[error("duplicate service name: {0}")]
    DuplicateService(String),

    #[error("weight {name} must be a non-negative finite number, got {value}")]
    Weight { name: &'static str, value: f64 },
}
