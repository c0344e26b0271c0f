//! Testing utilities.
//!
//! [`MockBackend`] stands in for the HTTP client so views and the router can
//! be driven deterministically:
//! - scripted responses per operation, consumed in order
//! - an in-memory fact store paged like the real `/facts`
//! - a record of every call that reached the backend
//! - an optional gate that holds responses until the test releases them

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use memory_api::{
    validate_limit, validate_query, Error, Fact, HealthResponse, ImportAck, ImportSource,
    QueryResponse, StatsResponse, Upload,
};
use tokio::sync::{watch, Semaphore};

use crate::backend::MemoryBackend;

/// A call that reached the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Stats,
    Health,
    Facts { limit: usize, offset: usize },
    Query(String),
    Import { file_name: String, bytes: Vec<u8>, source: ImportSource },
}

#[derive(Default)]
struct Script {
    stats: VecDeque<Result<StatsResponse, Error>>,
    health: VecDeque<Result<HealthResponse, Error>>,
    facts: VecDeque<Result<Vec<Fact>, Error>>,
    queries: VecDeque<Result<QueryResponse, Error>>,
    imports: VecDeque<Result<ImportAck, Error>>,
    store: Vec<Fact>,
    calls: Vec<MockCall>,
}

/// A backend that returns scripted responses.
///
/// When a script runs dry the mock answers from its fact store: stats count
/// the store, facts page through it, queries echo the question with no
/// retrieved facts, imports acknowledge with `{"status": "ok"}`.
#[derive(Clone)]
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
    calls_tx: Arc<watch::Sender<usize>>,
    gate: Option<Arc<Semaphore>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let (calls_tx, _) = watch::channel(0);
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            calls_tx: Arc::new(calls_tx),
            gate: None,
        }
    }

    /// A mock whose responses wait for [`MockBackend::release`].
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn with_facts(self, facts: Vec<Fact>) -> Self {
        self.lock().store = facts;
        self
    }

    pub fn queue_stats(&self, response: Result<StatsResponse, Error>) {
        self.lock().stats.push_back(response);
    }

    pub fn queue_health(&self, response: Result<HealthResponse, Error>) {
        self.lock().health.push_back(response);
    }

    pub fn queue_facts(&self, response: Result<Vec<Fact>, Error>) {
        self.lock().facts.push_back(response);
    }

    pub fn queue_query(&self, response: Result<QueryResponse, Error>) {
        self.lock().queries.push_back(response);
    }

    pub fn queue_import(&self, response: Result<ImportAck, Error>) {
        self.lock().imports.push_back(response);
    }

    /// Let `n` gated responses through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Wait until at least `n` calls have been received.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.calls_tx.subscribe();
        // Only fails if the sender is dropped, and `self` holds it.
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: MockCall) {
        let count = {
            let mut script = self.lock();
            script.calls.push(call);
            script.calls.len()
        };
        self.calls_tx.send_replace(count);
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl MemoryBackend for MockBackend {
    async fn stats(&self) -> Result<StatsResponse, Error> {
        self.record(MockCall::Stats);
        self.pass_gate().await;

        let mut script = self.lock();
        let total_facts = script.store.len() as u64;
        script.stats.pop_front().unwrap_or_else(|| {
            Ok(StatsResponse {
                total_facts,
                storage_type: "mock".to_string(),
                index_name: None,
            })
        })
    }

    async fn health(&self) -> Result<HealthResponse, Error> {
        self.record(MockCall::Health);
        self.pass_gate().await;

        self.lock().health.pop_front().unwrap_or_else(|| {
            Ok(HealthResponse {
                status: "ok".to_string(),
            })
        })
    }

    async fn facts(&self, limit: usize, offset: usize) -> Result<Vec<Fact>, Error> {
        validate_limit(limit)?;
        self.record(MockCall::Facts { limit, offset });
        self.pass_gate().await;

        let mut script = self.lock();
        match script.facts.pop_front() {
            Some(response) => response,
            None => Ok(script
                .store
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()),
        }
    }

    async fn query(&self, text: &str) -> Result<QueryResponse, Error> {
        validate_query(text)?;
        self.record(MockCall::Query(text.trim().to_string()));
        self.pass_gate().await;

        self.lock().queries.pop_front().unwrap_or_else(|| {
            Ok(QueryResponse {
                answer: format!("You asked: {}", text.trim()),
                retrieved_facts: Vec::new(),
            })
        })
    }

    async fn import_data(&self, upload: Upload, source: ImportSource) -> Result<ImportAck, Error> {
        self.record(MockCall::Import {
            file_name: upload.file_name,
            bytes: upload.bytes,
            source,
        });
        self.pass_gate().await;

        self.lock()
            .imports
            .pop_front()
            .unwrap_or_else(|| Ok(ImportAck(serde_json::json!({"status": "ok"}))))
    }
}
