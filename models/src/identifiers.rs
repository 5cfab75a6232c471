// models/src/identifiers.rs

use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// Longest national identifier accepted after normalization.
pub const MAX_NATIONAL_ID_LEN: usize = 32;

/// Generates a fresh document id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Normalizes a national identifier: surrounding whitespace is dropped and
/// letters are uppercased so that `ab-123` and ` AB-123 ` collide.
///
/// # Errors
/// Returns a `ValidationError` when the value is empty, longer than
/// `MAX_NATIONAL_ID_LEN`, or contains anything other than ASCII
/// alphanumerics, `-` and `/`.
pub fn normalize_national_id(raw: &str) -> ValidationResult<String> {
    let value = raw.trim().to_ascii_uppercase();
    if value.is_empty() {
        return Err(ValidationError::Required("nationalId"));
    }
    if value.len() > MAX_NATIONAL_ID_LEN {
        return Err(ValidationError::invalid(
            "nationalId",
            format!("must be at most {} characters", MAX_NATIONAL_ID_LEN),
        ));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '/'))
    {
        return Err(ValidationError::invalid(
            "nationalId",
            format!("unexpected character '{}'", c),
        ));
    }
    Ok(value)
}

/// Lowercases and trims an email address. Only the shape `local@domain` is
/// checked.
pub fn normalize_email(raw: &str) -> ValidationResult<String> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(value)
        }
        _ => Err(ValidationError::invalid("email", "must look like name@domain")),
    }
}
