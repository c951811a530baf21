//! Pinata pinning client
//!
//! Uploads image blobs and metadata JSON documents to IPFS through the
//! Pinata REST API and derives public gateway URLs for the returned
//! CIDs. Also fetches token metadata back through the gateway with a
//! moka cache in front; entries are keyed by CID so they can never go
//! stale.

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const PINATA_API_BASE: &str = "https://api.pinata.cloud";

/// Max metadata documents kept in the gateway read cache
const METADATA_CACHE_CAPACITY: u64 = 1000;

/// Upload/read timeout against Pinata and the gateway
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error types for pinning operations
#[derive(Debug)]
pub enum PinningError {
    RequestFailed(String),
    ProviderRejected { status: u16, body: String },
    InvalidResponse(String),
}

impl std::fmt::Display for PinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinningError::RequestFailed(msg) => write!(f, "Pinning request failed: {}", msg),
            PinningError::ProviderRejected { status, body } => {
                write!(f, "Pinning provider rejected request ({}): {}", status, body)
            }
            PinningError::InvalidResponse(msg) => write!(f, "Invalid pinning response: {}", msg),
        }
    }
}

impl std::error::Error for PinningError {}

/// Content pinning interface, injectable so tests can substitute fakes
#[async_trait]
pub trait PinningClient: Send + Sync {
    /// Upload binary content, returning its CID
    async fn pin_file(
        &self,
        bytes: Vec<u8>,
        name: &str,
        key_values: Vec<(String, String)>,
    ) -> Result<String, PinningError>;

    /// Upload a JSON document, returning its CID
    async fn pin_json(&self, value: &serde_json::Value) -> Result<String, PinningError>;

    /// Public gateway URL for a CID
    fn gateway_url(&self, cid: &str) -> String;

    /// Fetch a pinned metadata document back through the gateway
    async fn fetch_metadata(&self, cid: &str) -> Result<serde_json::Value, PinningError>;
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Production Pinata client
#[derive(Clone)]
pub struct PinataService {
    client: Client,
    jwt: String,
    api_base: String,
    gateway_host: String,
    metadata_cache: Arc<Cache<String, serde_json::Value>>,
}

impl PinataService {
    /// `gateway_host` is the bare gateway hostname
    /// (e.g. "example.mypinata.cloud"), as handed out by Pinata.
    pub fn new(jwt: String, gateway_host: String) -> Self {
        Self::with_api_base(jwt, gateway_host, PINATA_API_BASE.to_string())
    }

    pub fn with_api_base(jwt: String, gateway_host: String, api_base: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        let metadata_cache = Cache::builder()
            .max_capacity(METADATA_CACHE_CAPACITY)
            .build();

        Self {
            client,
            jwt,
            api_base,
            gateway_host,
            metadata_cache: Arc::new(metadata_cache),
        }
    }

    async fn parse_pin_response(response: reqwest::Response) -> Result<String, PinningError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Pinata rejected upload");
            return Err(PinningError::ProviderRejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| PinningError::InvalidResponse(format!("Malformed pin response: {}", e)))?;

        Ok(parsed.ipfs_hash)
    }
}

#[async_trait]
impl PinningClient for PinataService {
    async fn pin_file(
        &self,
        bytes: Vec<u8>,
        name: &str,
        key_values: Vec<(String, String)>,
    ) -> Result<String, PinningError> {
        info!(name = %name, size = bytes.len(), "Pinning file to IPFS");

        let keyvalues: serde_json::Map<String, serde_json::Value> = key_values
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();

        let pinata_metadata = serde_json::json!({
            "name": name,
            "keyvalues": keyvalues,
        });

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(name.to_string()),
            )
            .text("pinataMetadata", pinata_metadata.to_string());

        let response = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_base))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach Pinata");
                PinningError::RequestFailed(e.to_string())
            })?;

        let cid = Self::parse_pin_response(response).await?;
        info!(cid = %cid, "File pinned");
        Ok(cid)
    }

    async fn pin_json(&self, value: &serde_json::Value) -> Result<String, PinningError> {
        debug!("Pinning JSON document to IPFS");

        let body = serde_json::json!({ "pinataContent": value });

        let response = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_base))
            .bearer_auth(&self.jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach Pinata");
                PinningError::RequestFailed(e.to_string())
            })?;

        let cid = Self::parse_pin_response(response).await?;
        info!(cid = %cid, "JSON pinned");
        Ok(cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("https://{}/ipfs/{}", self.gateway_host, cid)
    }

    async fn fetch_metadata(&self, cid: &str) -> Result<serde_json::Value, PinningError> {
        if let Some(cached) = self.metadata_cache.get(cid).await {
            debug!(cid = %cid, "Metadata cache hit");
            return Ok(cached);
        }

        let url = self.gateway_url(cid);
        debug!(url = %url, "Fetching metadata from gateway");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PinningError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PinningError::ProviderRejected {
                status: status.as_u16(),
                body: format!("gateway returned {} for {}", status, cid),
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PinningError::InvalidResponse(format!("Metadata not JSON: {}", e)))?;

        self.metadata_cache
            .insert(cid.to_string(), value.clone())
            .await;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_url_uses_configured_host() {
        let service = PinataService::new("jwt".to_string(), "gateway.pinata.cloud".to_string());
        assert_eq!(
            service.gateway_url("QmTest123"),
            "https://gateway.pinata.cloud/ipfs/QmTest123"
        );
    }
}
