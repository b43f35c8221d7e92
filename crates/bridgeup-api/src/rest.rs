// REST client for the BridgeUp pull endpoints.
//
// Two resources: `/bridges` and `/boats`. Each returns a full snapshot
// of its entity slice plus a backend last-updated timestamp. The server
// marks responses cacheable for ~30s, which matches the fallback poll
// interval used upstream.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{BridgesResponse, VesselsResponse};

/// HTTP client for the BridgeUp REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a client from a base URL (e.g. `https://api.bridgeup.app`)
    /// and transport settings.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the full bridges snapshot.
    pub async fn bridges(&self) -> Result<BridgesResponse, Error> {
        self.get("bridges").await
    }

    /// Fetch the full vessels snapshot.
    pub async fn vessels(&self) -> Result<VesselsResponse, Error> {
        self.get("boats").await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, Error> {
        let url = self.resource_url(resource)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                resource: resource.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::Deserialization {
            resource: resource.to_owned(),
            message: e.to_string(),
        })
    }

    fn resource_url(&self, resource: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(resource)?)
    }
}
