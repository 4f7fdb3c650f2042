//! Validation error types
//!
//! Validation never stops at the first failure. Every failing field becomes a
//! [`ValidationError`] and the whole batch is raised as one
//! [`ValidationErrorSet`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable reason for a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Key is not in the service's schema
    OptionNotAvailable,
    /// Key exists but cannot be set
    OptionReadOnly,
    /// Value does not match the declared shape or constraints
    InvalidValue,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::OptionNotAvailable => "OPTION_NOT_AVAILABLE",
            ErrorCode::OptionReadOnly => "OPTION_READ_ONLY",
            ErrorCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Option key, or `key.field` for nested fields
    pub field: String,
    /// Human-readable reason
    pub message: String,
    /// Machine-readable reason
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    /// Key is not in the schema
    pub fn not_available(field: impl Into<String>) -> Self {
        Self::new(
            field,
            "option is not available for this service",
            ErrorCode::OptionNotAvailable,
        )
    }

    /// Key is read-only
    pub fn read_only(field: impl Into<String>) -> Self {
        Self::new(field, "option is read-only", ErrorCode::OptionReadOnly)
    }

    /// Value is invalid
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ErrorCode::InvalidValue)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

/// Every validation failure from one options map
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationErrorSet {
    /// Summary of the failures
    pub message: String,
    /// Failures in the order they were found
    pub errors: Vec<ValidationError>,
}

impl ValidationErrorSet {
    /// Build a set and its summary message
    pub fn new(errors: Vec<ValidationError>) -> Self {
        let mut fields: Vec<&str> = Vec::new();
        for error in &errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }

        let message = format!(
            "options validation failed with {} error(s): {}",
            errors.len(),
            fields.join(", ")
        );

        Self { message, errors }
    }

    /// `Ok(())` when `errors` is empty, otherwise the aggregate
    pub fn check(errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(errors))
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures for one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        let error = ValidationError::read_only("cors");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["code"], "OPTION_READ_ONLY");
        assert_eq!(json["field"], "cors");
    }

    #[test]
    fn test_summary_lists_each_field_once() {
        let set = ValidationErrorSet::new(vec![
            ValidationError::invalid_value("reverseProxy.ttl", "must be a number"),
            ValidationError::not_available("gzip"),
            ValidationError::invalid_value("reverseProxy.ttl", "is required"),
        ]);

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.to_string(),
            "options validation failed with 3 error(s): reverseProxy.ttl, gzip"
        );
        assert_eq!(set.for_field("reverseProxy.ttl").count(), 2);
    }

    #[test]
    fn test_check_empty_is_ok() {
        assert!(ValidationErrorSet::check(Vec::new()).is_ok());
        assert!(ValidationErrorSet::check(vec![ValidationError::not_available("x")]).is_err());
    }
}
