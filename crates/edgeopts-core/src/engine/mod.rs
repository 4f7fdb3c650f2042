//! Options update orchestration
//!
//! The [`OptionsUpdater`] is the entry point for changing a service's options.
//!
//! ## Flow
//!
//! ```text
//! Start
//!   │
//!   ▼
//! Split ── protectServeKeyEnabled ─────────────────────────┐
//!   │                                                      │
//!   ├── remaining options? ──► ResolveSchema ► Validate ► Apply
//!   │                                                      │
//!   └── nothing remaining ───► FetchCurrent                │
//!                                   │                      │
//!                                   ▼                      ▼
//!                           protect key requested? ──► SideEffect
//!                                   │
//!                                   ▼
//!                                 Done
//! ```
//!
//! Every error exit is final; nothing is retried.
//!
//! ## Partial Failure
//!
//! The protect-key call is a separate remote operation. If it fails after the
//! options were applied, the applied options stay applied and the error is
//! returned to the caller.

use crate::config::UpdaterConfig;
use crate::error::{Error, Result};
use crate::options::{OptionsMap, PROTECT_SERVE_KEY, SplitOptions};
use crate::resolver::MetadataResolver;
use crate::schema::SchemaDocument;
use crate::traits::{OptionsApi, ProtectKeyAction};
use crate::validate::validate_options;
use serde_json::Value;
use tracing::{debug, info, warn};

const GET_OPTIONS_CONTEXT: &str = "failed to get options";
const UPDATE_OPTIONS_CONTEXT: &str = "failed to update options";
const CREATE_PROTECT_KEY_CONTEXT: &str = "failed to create protect key";
const DELETE_PROTECT_KEY_CONTEXT: &str = "failed to delete protect key";

/// Validates and applies options updates for services
///
/// Holds no per-service state. One updater can serve any number of services
/// and concurrent callers (share it behind an `Arc`).
pub struct OptionsUpdater {
    /// Remote operations
    api: Box<dyn OptionsApi>,

    /// Action sent when the protect key is enabled
    protect_key_action: ProtectKeyAction,
}

impl OptionsUpdater {
    /// Create an updater with default settings
    pub fn new(api: Box<dyn OptionsApi>) -> Self {
        Self::with_config(api, UpdaterConfig::default())
    }

    /// Create an updater with explicit settings
    pub fn with_config(api: Box<dyn OptionsApi>, config: UpdaterConfig) -> Self {
        Self {
            api,
            protect_key_action: config.protect_key_action,
        }
    }

    /// The underlying API
    pub fn api(&self) -> &dyn OptionsApi {
        self.api.as_ref()
    }

    /// Fetch and index the options metadata for a service
    pub async fn metadata(&self, service_id: &str) -> Result<SchemaDocument> {
        MetadataResolver::new(self.api.as_ref()).resolve(service_id).await
    }

    /// Fetch the current options of a service
    pub async fn current(&self, service_id: &str) -> Result<OptionsMap> {
        require_service_id(service_id)?;
        self.fetch_current(service_id).await
    }

    /// Validate `options` for a service without writing anything
    ///
    /// Runs the split, resolve and validate steps of [`update`](Self::update).
    /// The schema is only fetched when there are options besides the
    /// protect-key pseudo-option.
    pub async fn check(&self, service_id: &str, options: &OptionsMap) -> Result<SplitOptions> {
        require_service_id(service_id)?;

        let split = SplitOptions::split(options)?;
        if split.has_remaining() {
            let schema = self.metadata(service_id).await?;
            validate_options(&split.remaining, &schema)?;
        }

        Ok(split)
    }

    /// Validate and apply `options` to a service
    ///
    /// `protectServeKeyEnabled` is not sent with the other options. `true`
    /// creates (or regenerates) the protect key and `false` deletes it, after
    /// the other options have been applied.
    ///
    /// # Returns
    ///
    /// The service's options after the update, with `protectServeKeyEnabled`
    /// set when the pseudo-option was requested.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingId`]: empty `service_id`, nothing is fetched
    /// - [`Error::Validation`]: one or more options failed validation, nothing is written
    /// - [`Error::Remote`]: a remote step failed
    ///
    /// # Non-atomicity
    ///
    /// If the protect-key call fails, the options applied before it are
    /// **not** rolled back.
    pub async fn update(&self, service_id: &str, options: &OptionsMap) -> Result<OptionsMap> {
        require_service_id(service_id)?;

        let SplitOptions {
            protect_key,
            remaining,
        } = SplitOptions::split(options)?;

        let applied = !remaining.is_empty();
        let mut result = if applied {
            let schema = self.metadata(service_id).await?;
            validate_options(&remaining, &schema)?;

            info!(
                "Applying {} option(s) to service {} via {}",
                remaining.len(),
                service_id,
                self.api.api_name()
            );

            self.api
                .update_options(service_id, &remaining)
                .await
                .map_err(|e| Error::remote(UPDATE_OPTIONS_CONTEXT, e))?
        } else {
            debug!("No options to apply for service {}; fetching current state", service_id);
            self.fetch_current(service_id).await?
        };

        if let Some(enabled) = protect_key {
            if let Err(e) = self.apply_protect_key(service_id, enabled).await {
                if applied {
                    warn!(
                        "Options for service {} were applied but the protect key change failed: {}",
                        service_id, e
                    );
                }
                return Err(e);
            }
            result.insert(PROTECT_SERVE_KEY.to_string(), Value::Bool(enabled));
        }

        info!("Options update complete for service {}", service_id);
        Ok(result)
    }

    async fn fetch_current(&self, service_id: &str) -> Result<OptionsMap> {
        self.api
            .get_options(service_id)
            .await
            .map_err(|e| Error::remote(GET_OPTIONS_CONTEXT, e))
    }

    async fn apply_protect_key(&self, service_id: &str, enabled: bool) -> Result<()> {
        if enabled {
            info!(
                "Requesting protect key for service {} (action: {})",
                service_id,
                self.protect_key_action.as_str()
            );
            self.api
                .create_protect_key(service_id, self.protect_key_action)
                .await
                .map_err(|e| Error::remote(CREATE_PROTECT_KEY_CONTEXT, e))
        } else {
            info!("Deleting protect key for service {}", service_id);
            self.api
                .delete_protect_key(service_id)
                .await
                .map_err(|e| Error::remote(DELETE_PROTECT_KEY_CONTEXT, e))
        }
    }
}

fn require_service_id(service_id: &str) -> Result<()> {
    if service_id.is_empty() {
        return Err(Error::missing_id("service id"));
    }
    Ok(())
}
