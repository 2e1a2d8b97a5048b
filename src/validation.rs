//! Input Validation
//!
//! Field-level validation for request payloads. Every handler validates its
//! deserialized body before touching the service layer, so malformed input
//! is rejected at the edge with a field-scoped message instead of surfacing
//! as a database or hashing error.
//!
//! Validators return a [`ValidationError`] carrying the offending field name
//! and a machine-readable code alongside the human-readable message.

use std::fmt;

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Field that failed validation (if applicable)
    pub field: Option<String>,
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a specific field
    pub fn for_field(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    Required,
    TooShort,
    TooLong,
    InvalidEmail,
}

// ============================================================================
// Validators
// ============================================================================

/// Validate that a field is present and non-empty after trimming
pub fn validate_required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::Required,
            format!("{} is required", field),
        ));
    }
    Ok(())
}

/// Validate string length is within `min..=max` characters
pub fn validate_length(
    value: &str,
    min: usize,
    max: usize,
    field: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooShort,
            format!("Must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooLong,
            format!("Must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    // Basic email validation:
    // - Must contain exactly one @
    // - Local part: non-empty, no leading/trailing/consecutive dots
    // - Domain: non-empty, contains at least one dot, valid characters
    let parts: Vec<&str> = value.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email format",
        ));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || local.len() > 64 {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email local part",
        ));
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email local part",
        ));
    }

    if domain.is_empty() || domain.len() > 255 {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email domain",
        ));
    }
    if !domain.contains('.') {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email domain",
        ));
    }
    if !domain.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-') {
        return Err(ValidationError::for_field(
            "email",
            ValidationErrorCode::InvalidEmail,
            "Invalid email domain characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(validate_required("value", "name").is_ok());
        assert!(validate_required("", "name").is_err());
        assert!(validate_required("   ", "name").is_err());
    }

    #[test]
    fn test_required_reports_field() {
        let err = validate_required("", "firstName").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("firstName"));
        assert_eq!(err.code, ValidationErrorCode::Required);
    }

    #[test]
    fn test_length_bounds() {
        assert!(validate_length("abcdefgh", 8, 128, "password").is_ok());
        assert!(validate_length("short", 8, 128, "password").is_err());
        assert!(validate_length(&"x".repeat(129), 8, 128, "password").is_err());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 8 characters, more than 8 bytes
        assert!(validate_length("pässwörd", 8, 128, "password").is_ok());
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@sub.example.co").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email(".leading@example.com").is_err());
        assert!(validate_email("double..dot@example.com").is_err());
        assert!(validate_email("user@bad_domain.com").is_err());
    }
}
