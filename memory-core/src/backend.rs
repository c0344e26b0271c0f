//! The backend seam the views talk through.

use async_trait::async_trait;
use memory_api::{
    Error, Fact, HealthResponse, ImportAck, ImportSource, MemoryClient, QueryResponse,
    StatsResponse, Upload,
};

/// Operations the memory backend offers to the views.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    async fn stats(&self) -> Result<StatsResponse, Error>;

    async fn health(&self) -> Result<HealthResponse, Error>;

    async fn facts(&self, limit: usize, offset: usize) -> Result<Vec<Fact>, Error>;

    async fn query(&self, text: &str) -> Result<QueryResponse, Error>;

    async fn import_data(&self, upload: Upload, source: ImportSource) -> Result<ImportAck, Error>;
}

#[async_trait]
impl MemoryBackend for MemoryClient {
    async fn stats(&self) -> Result<StatsResponse, Error> {
        self.get_stats().await
    }

    async fn health(&self) -> Result<HealthResponse, Error> {
        MemoryClient::health(self).await
    }

    async fn facts(&self, limit: usize, offset: usize) -> Result<Vec<Fact>, Error> {
        self.get_facts(limit, offset).await
    }

    async fn query(&self, text: &str) -> Result<QueryResponse, Error> {
        MemoryClient::query(self, text).await
    }

    async fn import_data(&self, upload: Upload, source: ImportSource) -> Result<ImportAck, Error> {
        MemoryClient::import_data(self, upload, source).await
    }
}
