//! Metadata resolution
//!
//! Fetches a service's options metadata and indexes it into a
//! [`SchemaDocument`]. Resolution happens once per orchestration call and the
//! result is never cached.

use crate::error::{Error, Result};
use crate::schema::SchemaDocument;
use crate::traits::OptionsApi;

/// Context attached to metadata fetch failures
pub const METADATA_CONTEXT: &str = "failed to get options metadata";

/// Resolves service IDs to schema documents through an [`OptionsApi`]
pub struct MetadataResolver<'a> {
    api: &'a dyn OptionsApi,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(api: &'a dyn OptionsApi) -> Self {
        Self { api }
    }

    /// Fetch and index the metadata for `service_id`
    ///
    /// # Errors
    ///
    /// - [`Error::MissingId`] if `service_id` is empty (no request is made)
    /// - [`Error::Remote`] if the metadata request fails
    pub async fn resolve(&self, service_id: &str) -> Result<SchemaDocument> {
        if service_id.is_empty() {
            return Err(Error::missing_id("service id"));
        }

        let descriptors = self
            .api
            .get_options_metadata(service_id)
            .await
            .map_err(|e| Error::remote(METADATA_CONTEXT, e))?;

        let schema = SchemaDocument::from_descriptors(descriptors);

        tracing::debug!(
            "Resolved options metadata for service {} via {}: {} dynamic, {} standard",
            service_id,
            self.api.api_name(),
            schema.dynamic_len(),
            schema.standard_len()
        );

        Ok(schema)
    }
}
