//! Managed database client
//!
//! A typed client for a hosted table reached over its REST surface.
//! The table is named `entries` and carries the entry columns plus a
//! server-assigned `created_at` used only for default ordering.
//!
//! The client is built fresh for every operation from the current
//! configuration. When the endpoint or the access key is missing the
//! client is unconfigured: reads return an empty collection (always
//! safe to call speculatively), writes fail with a configuration
//! error.

use serde_json::Value;
use tracing::debug;

use crate::error::SyncError;
use crate::models::{entries_from_value, Entry};

/// Table holding ledger entries
const TABLE: &str = "entries";

/// Endpoint URL + access key pair
#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    key: String,
}

impl Endpoint {
    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, TABLE)
    }
}

/// Client for the managed database backend
pub struct DatabaseClient {
    http: reqwest::Client,
    endpoint: Option<Endpoint>,
}

impl DatabaseClient {
    /// Bind a client to an endpoint and key, either of which may be
    /// absent
    pub fn new(http: reqwest::Client, url: Option<String>, key: Option<String>) -> Self {
        let endpoint = match (url, key) {
            (Some(url), Some(key)) => Some(Endpoint {
                url: url.trim_end_matches('/').to_string(),
                key,
            }),
            _ => None,
        };
        Self { http, endpoint }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Read the collection, newest first
    ///
    /// Unconfigured clients read as empty rather than erroring. Rows
    /// are decoded defensively; a single bad row never fails the read.
    pub async fn fetch_all(&self) -> Result<Vec<Entry>, SyncError> {
        let Some(endpoint) = &self.endpoint else {
            debug!("database backend unconfigured, reading as empty");
            return Ok(Vec::new());
        };

        let url = format!("{}?select=*&order=created_at.desc", endpoint.table_url());
        let response = self
            .http
            .get(&url)
            .header("apikey", &endpoint.key)
            .bearer_auth(&endpoint.key)
            .send()
            .await
            .map_err(|e| SyncError::Remote(e.to_string()))?;

        let body = check_response(response).await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| SyncError::Remote(format!("unexpected response from database: {}", e)))?;
        Ok(entries_from_value(&value))
    }

    /// Insert one row, then re-read the collection
    ///
    /// The authoritative result is always a fresh read, never the
    /// inserted row alone.
    pub async fn add(&self, entry: &Entry) -> Result<Vec<Entry>, SyncError> {
        let endpoint = self.configured()?;

        let response = self
            .http
            .post(endpoint.table_url())
            .header("apikey", &endpoint.key)
            .bearer_auth(&endpoint.key)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await
            .map_err(|e| SyncError::Remote(e.to_string()))?;

        check_response(response).await?;
        self.fetch_all().await
    }

    /// Delete rows matching the identifier, then re-read the collection
    pub async fn delete(&self, id: &str) -> Result<Vec<Entry>, SyncError> {
        let endpoint = self.configured()?;

        let url = format!("{}?id=eq.{}", endpoint.table_url(), urlencoding::encode(id));
        let response = self
            .http
            .delete(&url)
            .header("apikey", &endpoint.key)
            .bearer_auth(&endpoint.key)
            .send()
            .await
            .map_err(|e| SyncError::Remote(e.to_string()))?;

        check_response(response).await?;
        self.fetch_all().await
    }

    fn configured(&self) -> Result<&Endpoint, SyncError> {
        self.endpoint
            .as_ref()
            .ok_or_else(|| SyncError::Config("database backend not configured".to_string()))
    }
}

/// Surface a non-2xx response as a remote error, preferring the
/// server-reported message over a bare status line
async fn check_response(response: reqwest::Response) -> Result<String, SyncError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SyncError::Remote(e.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    Err(SyncError::Remote(message))
}
