// # HTTP Options API
//
// This crate implements `OptionsApi` over HTTPS with `reqwest`.
//
// ## Behavior
//
// - One HTTP request per trait call
// - Errors are mapped by status code and returned; nothing is retried
// - HTTP timeout from `ApiConfig::timeout_secs`
// - Dry-run mode performs GETs only and logs the writes it would send
// - The API token never appears in logs or `Debug` output
//
// ## API Reference
//
// - Options metadata: GET `/services/:id/options/metadata`
// - Current options: GET `/services/:id/options`
// - Apply options: PUT `/services/:id/options`
// - Protect key: POST `/services/:id/protect-key` `{ "action": "create" | "regenerate" }`
// - Delete protect key: DELETE `/services/:id/protect-key`

use async_trait::async_trait;
use edgeopts_core::config::ApiConfig;
use edgeopts_core::schema::OptionDescriptor;
use edgeopts_core::traits::{OptionsApi, ProtectKeyAction};
use edgeopts_core::{Error, OptionsMap, Result};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Name used in provider errors and logs
const API_NAME: &str = "http";

/// HTTP implementation of [`OptionsApi`]
///
/// # Dry-Run Mode
///
/// When `dry_run` is true:
/// - GET requests are performed
/// - PUT/POST/DELETE payloads are logged but **not** sent
/// - `update_options` returns the current state overlaid with the request
pub struct HttpOptionsApi {
    /// Base URL, parsed once
    base_url: Url,

    /// Bearer token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for HttpOptionsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOptionsApi")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Metadata responses are either a bare list or wrapped in `options`
#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataResponse {
    List(Vec<OptionDescriptor>),
    Wrapped { options: Vec<OptionDescriptor> },
}

impl HttpOptionsApi {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("Options API running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            base_url,
            api_token: config.api_token.clone(),
            client,
            dry_run: config.dry_run,
        })
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// `{base}/services/{id}/{path}` with the service ID as one encoded segment
    fn url(&self, service_id: &str, path: &str) -> Result<Url> {
        if service_id.is_empty() {
            return Err(Error::missing_id("service id"));
        }
        // Dot segments are dropped by the URL encoder, so they never reach it.
        if matches!(service_id, "." | "..") {
            return Err(Error::invalid_input(format!(
                "service id '{}' is not a valid path segment",
                service_id
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("API base URL cannot have a path: {}", self.base_url)))?
            .pop_if_empty()
            .push("services")
            .push(service_id)
            .extend(path.split('/'));
        Ok(url)
    }

    /// Send a request and return the successful response
    async fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<reqwest::Response> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(status_error(status, url.as_str(), &error_text))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<T> {
        self.send(method, url, body)
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(API_NAME, format!("Failed to parse response: {}", e)))
    }
}

/// Map a non-success status to an error
fn status_error(status: StatusCode, url: &str, error_text: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(url.to_string()),
        429 => Error::rate_limited(format!("Rate limit exceeded. Status: {}", status)),
        500..=599 => Error::provider(
            API_NAME,
            format!("Server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            API_NAME,
            format!("Request failed: {} - {}", status, error_text),
        ),
    }
}

/// Options endpoints return an object of option values
fn expect_options(value: Value) -> Result<OptionsMap> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::provider(
            API_NAME,
            "Invalid response format: options is not an object",
        )),
    }
}

#[async_trait]
impl OptionsApi for HttpOptionsApi {
    async fn get_options_metadata(&self, service_id: &str) -> Result<Vec<OptionDescriptor>> {
        let url = self.url(service_id, "options/metadata")?;
        let response: MetadataResponse = self.send_json(Method::GET, &url, None).await?;

        Ok(match response {
            MetadataResponse::List(descriptors) => descriptors,
            MetadataResponse::Wrapped { options } => options,
        })
    }

    async fn get_options(&self, service_id: &str) -> Result<OptionsMap> {
        let url = self.url(service_id, "options")?;
        expect_options(self.send_json(Method::GET, &url, None).await?)
    }

    async fn update_options(&self, service_id: &str, options: &OptionsMap) -> Result<OptionsMap> {
        let url = self.url(service_id, "options")?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with {} option(s)",
                url,
                options.len()
            );
            let mut current = self.get_options(service_id).await?;
            for (key, value) in options {
                current.insert(key.clone(), value.clone());
            }
            return Ok(current);
        }

        let body = Value::Object(options.clone());
        expect_options(self.send_json(Method::PUT, &url, Some(&body)).await?)
    }

    async fn create_protect_key(&self, service_id: &str, action: ProtectKeyAction) -> Result<()> {
        let url = self.url(service_id, "protect-key")?;
        let body = serde_json::json!({ "action": action.as_str() });

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send POST request to {} with payload: {}", url, body);
            return Ok(());
        }

        self.send(Method::POST, &url, Some(&body)).await?;
        Ok(())
    }

    async fn delete_protect_key(&self, service_id: &str) -> Result<()> {
        let url = self.url(service_id, "protect-key")?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send DELETE request to {}", url);
            return Ok(());
        }

        self.send(Method::DELETE, &url, None).await?;
        Ok(())
    }

    fn api_name(&self) -> &'static str {
        API_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(dry_run: bool) -> HttpOptionsApi {
        HttpOptionsApi::new(
            &ApiConfig::new("test_token")
                .with_base_url("https://api.example.test/v1/")
                .with_dry_run(dry_run),
        )
        .unwrap()
    }

    #[test]
    fn test_creation_requires_token() {
        assert!(HttpOptionsApi::new(&ApiConfig::new("")).is_err());
        assert!(HttpOptionsApi::new(&ApiConfig::new("token")).is_ok());
    }

    #[test]
    fn test_url_building_trims_trailing_slash() {
        assert_eq!(
            api(false).url("svc-1", "options/metadata").unwrap().as_str(),
            "https://api.example.test/v1/services/svc-1/options/metadata"
        );

        let api = HttpOptionsApi::new(
            &ApiConfig::new("test_token").with_base_url("https://api.example.test"),
        )
        .unwrap();
        assert_eq!(
            api.url("svc-1", "options").unwrap().as_str(),
            "https://api.example.test/services/svc-1/options"
        );
    }

    #[test]
    fn test_service_id_stays_one_path_segment() {
        let url = api(false).url("../accounts/42?x=", "options").unwrap();

        assert_eq!(url.path(), "/v1/services/..%2Faccounts%2F42%3Fx=/options");
        assert_eq!(url.query(), None);

        let url = api(false).url("svc#frag", "protect-key").unwrap();
        assert_eq!(url.path(), "/v1/services/svc%23frag/protect-key");
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_dot_service_ids_are_rejected() {
        assert!(matches!(api(false).url("..", "options"), Err(Error::InvalidInput(_))));
        assert!(matches!(api(false).url(".", "options"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_creation_rejects_unparseable_base_url() {
        let config = ApiConfig::new("test_token").with_base_url("https://exa mple.test");
        assert!(matches!(HttpOptionsApi::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_dry_run_mode() {
        assert!(api(true).is_dry_run());
        assert!(!api(false).is_dry_run());
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let api = HttpOptionsApi::new(&ApiConfig::new("secret_token_12345")).unwrap();

        let debug_str = format!("{:?}", api);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("HttpOptionsApi"));
    }

    #[test]
    fn test_status_error_mapping() {
        let url = "https://api.example.test/v1/services/x/options";

        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, url, ""), Error::Authentication(_)));
        assert!(matches!(status_error(StatusCode::FORBIDDEN, url, ""), Error::Authentication(_)));
        assert!(matches!(status_error(StatusCode::NOT_FOUND, url, ""), Error::NotFound(_)));
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, url, ""), Error::RateLimited(_)));

        let err = status_error(StatusCode::BAD_GATEWAY, url, "upstream down");
        assert!(err.to_string().contains("transient"));
        assert!(err.to_string().contains("upstream down"));

        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, url, "bad option");
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("bad option"));
    }

    #[test]
    fn test_metadata_response_shapes() {
        let list: MetadataResponse =
            serde_json::from_str(r#"[{"name": "CORS Override", "kind": "standard"}]"#).unwrap();
        assert!(matches!(list, MetadataResponse::List(ref d) if d.len() == 1));

        let wrapped: MetadataResponse = serde_json::from_str(
            r#"{"options": [{"name": "CORS Override", "kind": "standard"}, {"name": "Gzip", "kind": "standard"}]}"#,
        )
        .unwrap();
        assert!(matches!(wrapped, MetadataResponse::Wrapped { ref options } if options.len() == 2));
    }

    #[test]
    fn test_expect_options_requires_object() {
        assert!(expect_options(serde_json::json!({ "cors": true })).is_ok());
        assert!(expect_options(serde_json::json!([true])).is_err());
    }

    #[tokio::test]
    async fn test_dry_run_skips_protect_key_writes() {
        let api = api(true);

        assert!(api.create_protect_key("svc-1", ProtectKeyAction::Create).await.is_ok());
        assert!(api.delete_protect_key("svc-1").await.is_ok());
    }
}
