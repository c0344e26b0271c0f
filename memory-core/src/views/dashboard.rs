//! Dashboard: store statistics and backend liveness.

use memory_api::{Error, HealthResponse, StatsResponse};

use crate::remote::{Remote, RemoteSlot};
use crate::task::Ticket;

const UNKNOWN: &str = "unknown";
const LOADING: &str = "...";

#[derive(Debug, Default)]
pub struct Dashboard {
    stats: RemoteSlot<StatsResponse>,
    health: RemoteSlot<HealthResponse>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &Remote<StatsResponse> {
        self.stats.value()
    }

    pub fn health(&self) -> &Remote<HealthResponse> {
        self.health.value()
    }

    pub fn begin_stats(&mut self, ticket: Ticket) {
        self.stats.begin(ticket);
    }

    pub fn begin_health(&mut self, ticket: Ticket) {
        self.health.begin(ticket);
    }

    pub fn apply_stats(&mut self, ticket: Ticket, result: Result<StatsResponse, Error>) -> bool {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to load stats");
        }
        self.stats.resolve(ticket, result)
    }

    pub fn apply_health(&mut self, ticket: Ticket, result: Result<HealthResponse, Error>) -> bool {
        self.health.resolve(ticket, result)
    }

    /// Total fact count with thousands separators, or a placeholder.
    pub fn total_facts_label(&self) -> String {
        match self.stats() {
            Remote::Pending => LOADING.to_string(),
            Remote::Ready(stats) => group_thousands(stats.total_facts),
            Remote::Failed(_) => UNKNOWN.to_string(),
        }
    }

    pub fn storage_type_label(&self) -> String {
        match self.stats() {
            Remote::Pending => LOADING.to_string(),
            Remote::Ready(stats) if !stats.storage_type.is_empty() => stats.storage_type.clone(),
            _ => UNKNOWN.to_string(),
        }
    }

    pub fn index_name(&self) -> Option<&str> {
        self.stats().ready().and_then(|s| s.index_name.as_deref())
    }

    pub fn backend_label(&self) -> &'static str {
        match self.health() {
            Remote::Pending => "checking",
            Remote::Ready(health) if health.is_ok() => "online",
            Remote::Ready(_) => "degraded",
            Remote::Failed(_) => "offline",
        }
    }

    /// Why the stats could not be shown, if they could not.
    pub fn error(&self) -> Option<&str> {
        self.stats().error()
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(stats: Result<StatsResponse, Error>) -> Dashboard {
        let ticket = Ticket::new(1, 0);
        let mut dashboard = Dashboard::new();
        dashboard.begin_stats(ticket);
        assert!(dashboard.apply_stats(ticket, stats));
        dashboard
    }

    #[test]
    fn test_pending_labels() {
        let dashboard = Dashboard::new();
        assert_eq!(dashboard.total_facts_label(), "...");
        assert_eq!(dashboard.storage_type_label(), "...");
        assert_eq!(dashboard.backend_label(), "checking");
    }

    #[test]
    fn test_ready_labels() {
        let dashboard = loaded(Ok(StatsResponse {
            total_facts: 1_234_567,
            storage_type: "pinecone".into(),
            index_name: Some("memories".into()),
        }));
        assert_eq!(dashboard.total_facts_label(), "1,234,567");
        assert_eq!(dashboard.storage_type_label(), "pinecone");
        assert_eq!(dashboard.index_name(), Some("memories"));
        assert!(dashboard.error().is_none());
    }

    #[test]
    fn test_backend_error_renders_fallback() {
        let dashboard = loaded(Err(Error::Backend {
            status: 500,
            body: "Internal Server Error".into(),
        }));
        assert_eq!(dashboard.total_facts_label(), "unknown");
        assert_eq!(dashboard.storage_type_label(), "unknown");
        assert!(dashboard.index_name().is_none());
        assert!(dashboard.error().unwrap().contains("500"));
    }

    #[test]
    fn test_health_labels() {
        let ticket = Ticket::new(1, 1);
        let mut dashboard = Dashboard::new();
        dashboard.begin_health(ticket);
        dashboard.apply_health(ticket, Err(Error::Network("refused".into())));
        assert_eq!(dashboard.backend_label(), "offline");

        let ticket = Ticket::new(1, 2);
        dashboard.begin_health(ticket);
        dashboard.apply_health(ticket, Ok(HealthResponse { status: "ok".into() }));
        assert_eq!(dashboard.backend_label(), "online");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12345), "12,345");
    }
}
