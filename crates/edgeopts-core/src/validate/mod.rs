//! Options-map validation
//!
//! [`validate_options`] checks every key of an options map against a
//! [`SchemaDocument`]:
//!
//! 1. Unknown keys → `OPTION_NOT_AVAILABLE`
//! 2. Read-only keys → `OPTION_READ_ONLY`
//! 3. Dynamic keys → envelope rules, then the type validator for the property
//! 4. Standard keys → the structural rules in [`standard`]
//!
//! Keys are checked independently and all failures are returned together.

pub mod errors;
pub mod standard;
pub mod types;

pub use errors::{ErrorCode, ValidationError, ValidationErrorSet};

use serde_json::Value;

use crate::options::{OptionsMap, json_type_name};
use crate::schema::{PropertyDescriptor, ResolvedOption, SchemaDocument};

/// Validate every option in `options` against `schema`
pub fn validate_options(
    options: &OptionsMap,
    schema: &SchemaDocument,
) -> Result<(), ValidationErrorSet> {
    let mut errors = Vec::new();

    for (key, value) in options {
        validate_option(key, value, schema, &mut errors);
    }

    if !errors.is_empty() {
        tracing::debug!(
            "Options validation found {} error(s) across {} option(s)",
            errors.len(),
            options.len()
        );
    }

    ValidationErrorSet::check(errors)
}

fn validate_option(
    key: &str,
    value: &Value,
    schema: &SchemaDocument,
    errors: &mut Vec<ValidationError>,
) {
    let Some(resolved) = schema.resolve(key) else {
        errors.push(ValidationError::not_available(key));
        return;
    };

    if resolved.descriptor().read_only {
        errors.push(ValidationError::read_only(key));
        return;
    }

    match resolved {
        ResolvedOption::Dynamic { property, .. } => validate_dynamic(key, value, property, errors),
        ResolvedOption::Standard { key, .. } => standard::validate_standard(key, value, errors),
    }
}

/// Dynamic options accept either a bare value or an `{enabled, value}` envelope
fn validate_dynamic(
    key: &str,
    value: &Value,
    property: &PropertyDescriptor,
    errors: &mut Vec<ValidationError>,
) {
    if let Value::Object(envelope) = value
        && let Some(enabled) = envelope.get("enabled")
    {
        match enabled {
            Value::Bool(true) => match envelope.get("value") {
                Some(inner) => {
                    if let Err(reason) = types::validate_value(property, inner) {
                        errors.push(ValidationError::invalid_value(key, reason));
                    }
                }
                None => errors.push(ValidationError::invalid_value(
                    key,
                    "value is required when enabled is true",
                )),
            },
            Value::Bool(false) => {}
            other => errors.push(ValidationError::invalid_value(
                key,
                format!("enabled must be a boolean, got {}", json_type_name(other)),
            )),
        }
        return;
    }

    if let Err(reason) = types::validate_value(property, value) {
        errors.push(ValidationError::invalid_value(key, reason));
    }
}
