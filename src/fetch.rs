/*!
 * Remote fetch of provider records
 *
 * The service is an RPC endpoint: one POST with the department and
 * municipality identifiers, one JSON array back. There is no retry and no
 * partial success.
 */

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::AppConfig;
use crate::data_types::{LocationQuery, ProviderRecord};
use crate::{PrestadoresError, Result};

/// Anything that can produce the records for a location
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn fetch(&self, query: LocationQuery) -> Result<Vec<ProviderRecord>>;
}

/// HTTP client for the provider records endpoint
pub struct GeoDataClient {
    client: reqwest::Client,
    config: AppConfig,
}

impl GeoDataClient {
    /// Create a client from configuration
    ///
    /// Missing endpoint or key is not an error here; it is reported by
    /// [`RecordSource::fetch`] before any request is sent.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| PrestadoresError::Custom {
            message: format!("Failed to create HTTP client: {}", e),
            suggestion: Some("Check your network configuration".to_string()),
        })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Create a client pointed at an explicit endpoint
    pub fn with_endpoint(endpoint_url: &str, api_key: &str) -> Result<Self> {
        let config = AppConfig {
            endpoint_url: Some(endpoint_url.to_string()),
            api_key: Some(api_key.to_string()),
            ..AppConfig::default()
        };
        Self::new(&config)
    }

    fn headers(api_key: &str) -> Result<HeaderMap> {
        let invalid_key = |_| PrestadoresError::Configuration {
            message: "api_key contains characters not allowed in an HTTP header".to_string(),
            suggestion: Some("Check PRESTADORES_API_KEY for stray whitespace or quotes".to_string()),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid_key)?,
        );
        Ok(headers)
    }
}

impl RecordSource for GeoDataClient {
    async fn fetch(&self, query: LocationQuery) -> Result<Vec<ProviderRecord>> {
        let (url, key) = self.config.fetch_credentials()?;
        let headers = Self::headers(key)?;

        tracing::info!(
            department = query.department,
            municipality = query.municipality,
            "fetching provider records"
        );

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), url, "provider records request failed");
            return Err(PrestadoresError::Transport {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<ProviderRecord> =
            serde_json::from_slice(&body).map_err(|e| PrestadoresError::Deserialize {
                context: format!(
                    "provider records (department={}, municipality={})",
                    query.department, query.municipality
                ),
                source: e,
            })?;

        tracing::info!(records = records.len(), "provider records received");
        Ok(records)
    }
}
