//! Per-type value validators
//!
//! One validator per [`PropertyType`]. Each checks a single value against the
//! constraints of its property and returns the reason on failure. Presence
//! rules are not checked here.

use serde_json::Value;

use crate::options::json_type_name;
use crate::schema::{BitField, PropertyDescriptor, PropertyType};

/// Reason a value failed its type check
pub type TypeResult = Result<(), String>;

/// Validate `value` against `property`
pub fn validate_value(property: &PropertyDescriptor, value: &Value) -> TypeResult {
    match property.property_type {
        PropertyType::Boolean => validate_boolean(value),
        PropertyType::Integer => validate_integer(value, property.min_value, property.max_value),
        PropertyType::String => validate_string(value),
        PropertyType::Enum => validate_enum(value, &property.enum_values),
        PropertyType::Bitfield => validate_bitfield(value, &property.bit_fields),
        PropertyType::StringList => validate_string_list(value),
    }
}

pub fn validate_boolean(value: &Value) -> TypeResult {
    match value {
        Value::Bool(_) => Ok(()),
        other => Err(format!("must be a boolean, got {}", json_type_name(other))),
    }
}

/// Integer within optional inclusive bounds
///
/// Integral floats such as `10.0` are accepted.
pub fn validate_integer(value: &Value, min_value: Option<i64>, max_value: Option<i64>) -> TypeResult {
    let n = as_integer(value)
        .ok_or_else(|| format!("must be an integer, got {}", describe(value)))?;

    if let Some(min) = min_value
        && n < i128::from(min)
    {
        return Err(format!("must be at least {}, got {}", min, describe(value)));
    }

    if let Some(max) = max_value
        && n > i128::from(max)
    {
        return Err(format!("must be at most {}, got {}", max, describe(value)));
    }

    Ok(())
}

pub fn validate_string(value: &Value) -> TypeResult {
    match value {
        Value::String(_) => Ok(()),
        other => Err(format!("must be a string, got {}", json_type_name(other))),
    }
}

/// String equal to one of `allowed` (case-sensitive)
pub fn validate_enum(value: &Value, allowed: &[String]) -> TypeResult {
    let s = value
        .as_str()
        .ok_or_else(|| format!("must be a string, got {}", json_type_name(value)))?;

    if allowed.iter().any(|a| a == s) {
        Ok(())
    } else {
        Err(format!(
            "invalid value '{}'; valid values are: {}",
            s,
            allowed.join(", ")
        ))
    }
}

/// Object whose keys all belong to the declared bit fields
pub fn validate_bitfield(value: &Value, bit_fields: &[BitField]) -> TypeResult {
    let object = value
        .as_object()
        .ok_or_else(|| format!("must be an object, got {}", json_type_name(value)))?;

    match object
        .keys()
        .find(|key| !bit_fields.iter().any(|field| &field.key == *key))
    {
        Some(unknown) => Err(format!("unknown bit field '{}'", unknown)),
        None => Ok(()),
    }
}

pub fn validate_string_list(value: &Value) -> TypeResult {
    let items = value
        .as_array()
        .ok_or_else(|| format!("must be a list of strings, got {}", json_type_name(value)))?;

    match items.iter().position(|item| !item.is_string()) {
        Some(index) => Err(format!(
            "must be a list of strings; element {} is {}",
            index,
            json_type_name(&items[index])
        )),
        None => Ok(()),
    }
}

fn as_integer(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(i128::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Some(i128::from(n));
    }
    // Saturates outside the i128 range, which still orders correctly
    // against i64 bounds.
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => json_type_name(other).to_string(),
    }
}
