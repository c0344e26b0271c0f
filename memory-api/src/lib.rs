//! HTTP client for the unified memory backend.
//!
//! This crate wraps the backend's small REST surface:
//! - Store statistics and liveness (`/stats`, `/health`)
//! - Paginated fact listing (`/facts`)
//! - Memory-grounded question answering (`/query`)
//! - Conversation export import (`/import`, multipart)
//!
//! The client never retries a request. No timeout is applied unless one is
//! configured through [`ClientConfig`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Number of facts the backend may retrieve for a single query.
pub const QUERY_TOP_K: usize = 5;

/// Errors that can occur when talking to the memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of a backend error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Connection settings for [`MemoryClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given backend origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Abort any request that takes longer than `timeout` end to end.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

/// Memory backend API client.
#[derive(Clone)]
pub struct MemoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl MemoryClient {
    /// Create a client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid backend URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported scheme '{}' in backend URL",
                parsed.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// The backend origin this client talks to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch store statistics.
    pub async fn get_stats(&self) -> Result<StatsResponse, Error> {
        tracing::debug!(base_url = %self.base_url, "GET /stats");
        let response = self
            .client
            .get(self.endpoint("stats"))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        decode(response).await
    }

    /// Check that the backend is up.
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        tracing::debug!(base_url = %self.base_url, "GET /health");
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        decode(response).await
    }

    /// Fetch one page of facts.
    ///
    /// Ordering and pagination belong to the backend. The returned list never
    /// holds more than `limit` entries.
    pub async fn get_facts(&self, limit: usize, offset: usize) -> Result<Vec<Fact>, Error> {
        validate_limit(limit)?;

        tracing::debug!(base_url = %self.base_url, limit, offset, "GET /facts");
        let response = self
            .client
            .get(self.endpoint("facts"))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let mut facts: Vec<Fact> = decode(response).await?;
        if facts.len() > limit {
            tracing::warn!(
                returned = facts.len(),
                limit,
                "backend returned more facts than requested, truncating"
            );
            facts.truncate(limit);
        }

        Ok(facts)
    }

    /// Ask a question answered from stored memories.
    pub async fn query(&self, text: &str) -> Result<QueryResponse, Error> {
        validate_query(text)?;

        tracing::debug!(base_url = %self.base_url, chars = text.len(), "POST /query");
        let response = self
            .client
            .post(self.endpoint("query"))
            .json(&ApiQueryRequest {
                query: text,
                top_k: QUERY_TOP_K,
            })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        decode(response).await
    }

    /// Upload a conversation export for background processing.
    ///
    /// The file is sent as-is; validating its content is the backend's job.
    pub async fn import_data(
        &self,
        upload: Upload,
        source: ImportSource,
    ) -> Result<ImportAck, Error> {
        tracing::debug!(
            base_url = %self.base_url,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            %source,
            "POST /import"
        );
        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("import"))
            .query(&[("type", source.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        decode(response).await.map(ImportAck)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// Reject query text before it reaches the network.
pub fn validate_query(text: &str) -> Result<(), Error> {
    if text.trim().is_empty() {
        return Err(Error::Validation(
            "query text must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_limit(limit: usize) -> Result<(), Error> {
    if limit == 0 {
        return Err(Error::Validation(
            "limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Map a response to a typed value, separating HTTP failures from bad JSON.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Backend {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
}

// ============================================================================
// Public types
// ============================================================================

/// A single extracted memory unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub content: String,
    pub category: String,
    /// ISO-8601 timestamp, when the backend recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Fact {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            category: category.into(),
            timestamp: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Snapshot of the backend's fact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_facts: u64,
    pub storage_type: String,
    #[serde(default)]
    pub index_name: Option<String>,
}

/// Answer to a query plus the facts it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub retrieved_facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Which provider an export file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    #[default]
    ChatGpt,
    Claude,
}

impl ImportSource {
    pub const ALL: [ImportSource; 2] = [ImportSource::ChatGpt, ImportSource::Claude];

    /// Wire name used in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::ChatGpt => "chatgpt",
            ImportSource::Claude => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportSource::ChatGpt => "ChatGPT",
            ImportSource::Claude => "Claude",
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatgpt" => Ok(ImportSource::ChatGpt),
            "claude" => Ok(ImportSource::Claude),
            other => Err(Error::Validation(format!(
                "unknown import source '{other}' (expected chatgpt or claude)"
            ))),
        }
    }
}

/// A file selected for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Acknowledgement returned by the import endpoint.
///
/// The shape is defined by the backend, so the raw JSON is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportAck(pub serde_json::Value);

impl ImportAck {
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(|v| v.as_str())
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(|v| v.as_str())
    }
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiQueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unreachable_client() -> MemoryClient {
        // Port 9 (discard) on loopback; validation must fail before any connect.
        MemoryClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.timeout().is_none());
        assert!(config.connect_timeout().is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("http://memory:9000")
            .with_timeout(Duration::from_secs(30))
            .with_connect_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url(), "http://memory:9000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = MemoryClient::new(ClientConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("stats"), "http://localhost:8000/stats");
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let err = MemoryClient::new(ClientConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));

        let err = MemoryClient::new(ClientConfig::new("ftp://localhost"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_locally() {
        let client = unreachable_client();
        assert!(matches!(client.query("").await, Err(Error::Validation(_))));
        assert!(matches!(client.query("   \n").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected_locally() {
        let client = unreachable_client();
        assert!(matches!(
            client.get_facts(0, 0).await,
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_fact_optional_fields() {
        let fact: Fact = serde_json::from_value(json!({
            "id": "f1",
            "content": "Loves Rust",
            "category": "preference"
        }))
        .unwrap();
        assert_eq!(fact, Fact::new("f1", "Loves Rust", "preference"));

        let fact: Fact = serde_json::from_value(json!({
            "id": "f2",
            "content": "Ships v2",
            "category": "project",
            "timestamp": "2024-05-01T10:00:00Z",
            "metadata": {"source": "chatgpt"}
        }))
        .unwrap();
        assert_eq!(fact.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(fact.metadata["source"], json!("chatgpt"));
    }

    #[test]
    fn test_stats_rejects_negative_count() {
        let result: Result<StatsResponse, _> = serde_json::from_value(json!({
            "total_facts": -1,
            "storage_type": "mock"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_import_source_parsing() {
        assert_eq!("chatgpt".parse::<ImportSource>().unwrap(), ImportSource::ChatGpt);
        assert_eq!("Claude".parse::<ImportSource>().unwrap(), ImportSource::Claude);
        assert!(matches!(
            "gemini".parse::<ImportSource>(),
            Err(Error::Validation(_))
        ));
        assert_eq!(
            serde_json::to_value(ImportSource::ChatGpt).unwrap(),
            json!("chatgpt")
        );
    }

    #[test]
    fn test_import_ack_accessors() {
        let ack = ImportAck(json!({
            "status": "processing_started",
            "message": "Import started in background"
        }));
        assert_eq!(ack.status(), Some("processing_started"));
        assert_eq!(ack.message(), Some("Import started in background"));

        let bare = ImportAck(json!(true));
        assert_eq!(bare.status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Backend {
            status: 503,
            body: "Components not initialized".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "Backend error (status 503): Components not initialized"
        );
        assert_eq!(Error::Network("refused".into()).status(), None);
    }
}
