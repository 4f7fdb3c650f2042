//! Structural rules for standard options
//!
//! Standard options have fixed keys and no property descriptor, so their
//! values are checked by hand-written rules instead of the type validators.

use serde_json::{Map, Value};

use super::errors::ValidationError;
use super::types;
use crate::options::json_type_name;

/// Standard options whose value is a plain boolean
pub const BOOLEAN_OPTIONS: &[&str] = &[
    "protectServeKeyEnabled",
    "cors",
    "referrerBlocking",
    "autoRedirect",
];

/// Key of the composite reverse-proxy option
pub const REVERSE_PROXY: &str = "reverseProxy";

/// Fields required when the reverse proxy is enabled
const PROXY_REQUIRED_FIELDS: &[&str] = &[
    "hostname",
    "originScheme",
    "useRobotsTxt",
    "ttl",
    "cacheByQueryParam",
];

/// Additional fields required for an enabled object-storage origin
const OBJECT_STORAGE_FIELDS: &[&str] = &["accessKey", "secretKey", "region"];

const PROXY_MODE_WEB: &str = "WEB";
const PROXY_MODE_OBJECT_STORAGE: &str = "OBJECT_STORAGE";
const ORIGIN_SCHEMES: &[&str] = &["FOLLOW", "HTTP", "HTTPS"];

/// Validate the value of the standard option `key`
pub fn validate_standard(key: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    if BOOLEAN_OPTIONS.contains(&key) {
        if let Err(reason) = types::validate_boolean(value) {
            errors.push(ValidationError::invalid_value(key, reason));
        }
        return;
    }

    if key == REVERSE_PROXY {
        validate_reverse_proxy(value, errors);
        return;
    }

    validate_unclassified(key, value, errors);
}

fn validate_reverse_proxy(value: &Value, errors: &mut Vec<ValidationError>) {
    let Some(proxy) = value.as_object() else {
        errors.push(ValidationError::invalid_value(
            REVERSE_PROXY,
            format!("must be an object, got {}", json_type_name(value)),
        ));
        return;
    };

    let enabled = match proxy.get("enabled") {
        Some(Value::Bool(enabled)) => Some(*enabled),
        Some(other) => {
            errors.push(ValidationError::invalid_value(
                proxy_field("enabled"),
                format!("must be a boolean, got {}", json_type_name(other)),
            ));
            None
        }
        None => {
            errors.push(ValidationError::invalid_value(
                proxy_field("enabled"),
                "is required",
            ));
            None
        }
    };

    let mode = match proxy.get("mode") {
        None => None,
        Some(Value::String(mode)) if mode == PROXY_MODE_WEB || mode == PROXY_MODE_OBJECT_STORAGE => {
            Some(mode.as_str())
        }
        Some(_) => {
            errors.push(ValidationError::invalid_value(
                proxy_field("mode"),
                format!("must be one of: {}, {}", PROXY_MODE_WEB, PROXY_MODE_OBJECT_STORAGE),
            ));
            None
        }
    };

    if enabled == Some(true) {
        require_fields(proxy, PROXY_REQUIRED_FIELDS, errors);
        if mode == Some(PROXY_MODE_OBJECT_STORAGE) {
            require_fields(proxy, OBJECT_STORAGE_FIELDS, errors);
        }
    }

    check_field(proxy, "hostname", errors, types::validate_string);
    check_field(proxy, "useRobotsTxt", errors, types::validate_boolean);
    check_field(proxy, "cacheByQueryParam", errors, types::validate_boolean);
    check_field(proxy, "ttl", errors, |v| match v {
        Value::Number(_) => Ok(()),
        other => Err(format!("must be a number, got {}", json_type_name(other))),
    });
    check_field(proxy, "originScheme", errors, |v| match v.as_str() {
        Some(s) if ORIGIN_SCHEMES.contains(&s) => Ok(()),
        _ => Err(format!("must be one of: {}", ORIGIN_SCHEMES.join(", "))),
    });
}

// Deliberately weak; only `enabled` inside an object is checked.
fn validate_unclassified(key: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    match value {
        Value::Bool(_) | Value::Array(_) => {}
        Value::Object(object) => {
            if let Some(enabled) = object.get("enabled")
                && !enabled.is_boolean()
            {
                errors.push(ValidationError::invalid_value(
                    format!("{}.enabled", key),
                    format!("must be a boolean, got {}", json_type_name(enabled)),
                ));
            }
        }
        other => errors.push(ValidationError::invalid_value(
            key,
            format!("must be a boolean, list or object, got {}", json_type_name(other)),
        )),
    }
}

fn require_fields(object: &Map<String, Value>, fields: &[&str], errors: &mut Vec<ValidationError>) {
    for field in fields {
        if !object.contains_key(*field) {
            errors.push(ValidationError::invalid_value(proxy_field(field), "is required"));
        }
    }
}

fn check_field<F>(object: &Map<String, Value>, field: &str, errors: &mut Vec<ValidationError>, check: F)
where
    F: Fn(&Value) -> types::TypeResult,
{
    if let Some(value) = object.get(field)
        && let Err(reason) = check(value)
    {
        errors.push(ValidationError::invalid_value(proxy_field(field), reason));
    }
}

fn proxy_field(field: &str) -> String {
    format!("{}.{}", REVERSE_PROXY, field)
}
