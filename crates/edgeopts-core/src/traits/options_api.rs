// # Options API Trait
//
// Defines the remote operations the options engine consumes.
//
// ## Implementations
//
// - HTTP: `edgeopts-http` crate
// - Test doubles: `crates/edgeopts-core/tests/common`
//
// ## Usage
//
// ```rust,ignore
// use edgeopts_core::OptionsApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* OptionsApi implementation */;
//
//     let descriptors = api.get_options_metadata("svc-123").await?;
//     let current = api.get_options("svc-123").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::options::OptionsMap;
use crate::schema::OptionDescriptor;

/// Action sent when enabling the protect key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectKeyAction {
    /// Create a key if none exists
    #[default]
    Create,
    /// Replace the existing key with a new one
    Regenerate,
}

impl ProtectKeyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectKeyAction::Create => "create",
            ProtectKeyAction::Regenerate => "regenerate",
        }
    }
}

impl std::str::FromStr for ProtectKeyAction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(ProtectKeyAction::Create),
            "regenerate" => Ok(ProtectKeyAction::Regenerate),
            other => Err(crate::Error::config(format!(
                "unknown protect key action '{}' (expected create or regenerate)",
                other
            ))),
        }
    }
}

/// Remote options operations for a service
///
/// Every method is a single request/response. Implementations must not
/// retry, cache, or spawn background work; failures are returned to the
/// caller as they happen.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait OptionsApi: Send + Sync {
    /// Fetch the options metadata document for a service
    ///
    /// ```http
    /// GET /services/:service_id/options/metadata
    /// ```
    async fn get_options_metadata(
        &self,
        service_id: &str,
    ) -> Result<Vec<OptionDescriptor>, crate::Error>;

    /// Fetch the current options of a service
    ///
    /// ```http
    /// GET /services/:service_id/options
    /// ```
    async fn get_options(&self, service_id: &str) -> Result<OptionsMap, crate::Error>;

    /// Apply options and return the resulting state
    ///
    /// ```http
    /// PUT /services/:service_id/options
    /// ```
    async fn update_options(
        &self,
        service_id: &str,
        options: &OptionsMap,
    ) -> Result<OptionsMap, crate::Error>;

    /// Create or regenerate the service's protect key
    ///
    /// ```http
    /// POST /services/:service_id/protect-key
    /// { "action": "create" }
    /// ```
    async fn create_protect_key(
        &self,
        service_id: &str,
        action: ProtectKeyAction,
    ) -> Result<(), crate::Error>;

    /// Delete the service's protect key
    ///
    /// ```http
    /// DELETE /services/:service_id/protect-key
    /// ```
    async fn delete_protect_key(&self, service_id: &str) -> Result<(), crate::Error>;

    /// Name of the implementation (for logging/debugging)
    fn api_name(&self) -> &'static str;
}
