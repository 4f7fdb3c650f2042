//! Configuration types for the options engine
//!
//! This module defines the configuration structures shared by the engine,
//! the HTTP transport and the command-line client.

use serde::{Deserialize, Serialize};

use crate::traits::ProtectKeyAction;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://api.edgeopts.example/v1";

/// Connection settings for the options API
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Perform reads only; log writes instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl ApiConfig {
    /// Create a configuration with defaults for everything but the token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_token: api_token.into(),
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "API base URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }

        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "API timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Action sent when `protectServeKeyEnabled` is true
    #[serde(default)]
    pub protect_key_action: ProtectKeyAction,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: ApiConfig = serde_json::from_str(r#"{"api_token": "abc"}"#).unwrap();

        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ApiConfig::new("").validate().is_err());
        assert!(ApiConfig::new("t").with_base_url("ftp://x").validate().is_err());
        assert!(ApiConfig::new("t").with_timeout_secs(0).validate().is_err());
        assert!(ApiConfig::new("t").with_timeout_secs(301).validate().is_err());
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let config = ApiConfig::new("secret_token_12345");
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn test_updater_config_action() {
        assert_eq!(UpdaterConfig::default().protect_key_action, ProtectKeyAction::Create);

        let config: UpdaterConfig =
            serde_json::from_str(r#"{"protect_key_action": "regenerate"}"#).unwrap();
        assert_eq!(config.protect_key_action, ProtectKeyAction::Regenerate);
    }
}
