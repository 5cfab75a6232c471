// models/src/errors.rs

pub use thiserror::Error;

/// A validation error raised while building or checking a document.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was missing or blank.
    #[error("{0} is required")]
    Required(&'static str),
    /// A field carried a value outside its allowed domain.
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    /// A value could not be parsed into one of the enumerated variants.
    #[error("'{value}' is not a valid {kind}; expected one of: {expected}")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The document as a whole could not be decoded.
    #[error("{0}")]
    Malformed(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fails with `Required` when `value` is empty after trimming.
pub fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}
