use crate::errors::{ConfigError, SyncError};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("property_map_sync/", env!("CARGO_PKG_VERSION"));

/// Moves request bodies to and from the backend. Timeouts and retries live here,
/// not in the query client.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str) -> Result<String, SyncError>;
    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String, SyncError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` to the base URL, keeping any path prefix the base carries.
    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| SyncError::Network(format!("bad endpoint {joined}: {e}")))
    }

    fn read_body(resp: reqwest::blocking::Response) -> Result<String, SyncError> {
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(SyncError::Network(format!("HTTP {status}: {text}")));
        }

        Ok(text)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<String, SyncError> {
        let url = self.endpoint(path)?;
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Self::read_body(resp)
    }

    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String, SyncError> {
        let url = self.endpoint(path)?;
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Self::read_body(resp)
    }
}
