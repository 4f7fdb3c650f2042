//! Caller-supplied options maps
//!
//! An options map is a JSON object from option key to value. One key,
//! [`PROTECT_SERVE_KEY`], is not a real option: it triggers creation or
//! deletion of the service's protect key. [`SplitOptions::split`] separates
//! it from the rest without touching the caller's map.

use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::validate::{ValidationError, ValidationErrorSet};

/// Mapping from option key to an arbitrary JSON value
pub type OptionsMap = serde_json::Map<String, Value>;

/// Pseudo-option that toggles the protect key instead of updating a field
pub const PROTECT_SERVE_KEY: &str = "protectServeKeyEnabled";

/// An options map split into the pseudo-option and the options to apply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOptions {
    /// Requested protect-key state, if the pseudo-option was present
    pub protect_key: Option<bool>,
    /// Every other option, to be validated and applied
    pub remaining: OptionsMap,
}

impl SplitOptions {
    /// Split `options` into the pseudo-option value and the remaining options
    ///
    /// A non-boolean pseudo-option is rejected here, before any remote call.
    pub fn split(options: &OptionsMap) -> std::result::Result<Self, ValidationErrorSet> {
        let protect_key = match options.get(PROTECT_SERVE_KEY) {
            None => None,
            Some(Value::Bool(enabled)) => Some(*enabled),
            Some(_) => {
                return Err(ValidationErrorSet::new(vec![ValidationError::invalid_value(
                    PROTECT_SERVE_KEY,
                    "must be a boolean",
                )]));
            }
        };

        let remaining = options
            .iter()
            .filter(|(key, _)| key.as_str() != PROTECT_SERVE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            protect_key,
            remaining,
        })
    }

    /// Whether there is anything to validate and apply
    pub fn has_remaining(&self) -> bool {
        !self.remaining.is_empty()
    }
}

/// Parse an options map from JSON text
///
/// The document must be a JSON object.
pub fn parse_options(json: &str) -> Result<OptionsMap> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_input(format!(
            "options must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Load an options map from a JSON file
pub async fn load_options_file<P: AsRef<Path>>(path: P) -> Result<OptionsMap> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::invalid_input(format!(
            "failed to read options file {}: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!("Loaded options file: {}", path.display());
    parse_options(&contents)
}

/// Short JSON type name for messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorCode;
    use serde_json::json;
    use std::io::Write;

    fn map(value: Value) -> OptionsMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_split_extracts_pseudo_option() {
        let options = map(json!({ "protectServeKeyEnabled": true, "cors": false }));

        let split = SplitOptions::split(&options).unwrap();

        assert_eq!(split.protect_key, Some(true));
        assert_eq!(split.remaining, map(json!({ "cors": false })));
        assert!(split.has_remaining());
    }

    #[test]
    fn test_split_leaves_caller_map_untouched() {
        let options = map(json!({ "protectServeKeyEnabled": false }));
        let before = options.clone();

        let split = SplitOptions::split(&options).unwrap();

        assert_eq!(options, before);
        assert_eq!(split.protect_key, Some(false));
        assert!(!split.has_remaining());
    }

    #[test]
    fn test_split_without_pseudo_option() {
        let options = map(json!({ "maxAge": 10 }));

        let split = SplitOptions::split(&options).unwrap();

        assert_eq!(split.protect_key, None);
        assert_eq!(split.remaining, options);
    }

    #[test]
    fn test_split_rejects_non_boolean_pseudo_option() {
        let options = map(json!({ "protectServeKeyEnabled": "yes" }));

        let err = SplitOptions::split(&options).unwrap_err();

        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].field, PROTECT_SERVE_KEY);
        assert_eq!(err.errors()[0].code, ErrorCode::InvalidValue);
    }

    #[test]
    fn test_parse_options_requires_object() {
        assert!(parse_options(r#"{"cors": true}"#).is_ok());

        let err = parse_options("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("list"));

        assert!(matches!(parse_options("{not json"), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_load_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cors": true, "maxAge": 60}}"#).unwrap();

        let options = load_options_file(file.path()).await.unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options["maxAge"], json!(60));
    }

    #[tokio::test]
    async fn test_load_missing_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = load_options_file(&missing).await.unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("missing.json"));
    }
}
