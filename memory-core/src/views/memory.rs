//! Memory browser: every fetched fact, narrowed by search text and category.

use chrono::{DateTime, NaiveDateTime};
use memory_api::{Error, Fact};

use crate::input::InputBuffer;
use crate::remote::{Remote, RemoteSlot};
use crate::task::Ticket;

/// Page size the browser asks for on mount.
pub const DEFAULT_PAGE_SIZE: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
}

pub const CATEGORIES: [Category; 4] = [
    Category { id: "goal", label: "Goals" },
    Category { id: "project", label: "Projects" },
    Category { id: "preference", label: "Preferences" },
    Category { id: "other", label: "Other" },
];

/// Whether `fact` passes the search text and category filter.
///
/// Search is a case-insensitive substring match on content or category; the
/// category filter is a case-insensitive equality match.
pub fn fact_matches(fact: &Fact, search: &str, category: Option<&str>) -> bool {
    let needle = search.to_lowercase();
    let fact_category = fact.category.to_lowercase();

    let matches_search = needle.is_empty()
        || fact.content.to_lowercase().contains(&needle)
        || fact_category.contains(&needle);
    let matches_category = category.map_or(true, |c| fact_category == c.to_lowercase());

    matches_search && matches_category
}

pub fn filter_facts<'a>(facts: &'a [Fact], search: &str, category: Option<&str>) -> Vec<&'a Fact> {
    facts
        .iter()
        .filter(|fact| fact_matches(fact, search, category))
        .collect()
}

pub fn category_count(facts: &[Fact], category: &str) -> usize {
    facts
        .iter()
        .filter(|fact| fact.category.eq_ignore_ascii_case(category))
        .count()
}

/// Render an ISO timestamp as `YYYY-MM-DD HH:MM`, or return it unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

#[derive(Debug)]
pub struct MemoryBrowser {
    facts: RemoteSlot<Vec<Fact>>,
    search: InputBuffer,
    category: Option<String>,
    page_size: usize,
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MemoryBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            facts: RemoteSlot::new(),
            search: InputBuffer::new(),
            category: None,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn facts(&self) -> &Remote<Vec<Fact>> {
        self.facts.value()
    }

    pub fn begin_load(&mut self, ticket: Ticket) {
        self.facts.begin(ticket);
    }

    pub fn apply_facts(&mut self, ticket: Ticket, result: Result<Vec<Fact>, Error>) -> bool {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to load facts");
        }
        self.facts.resolve(ticket, result)
    }

    pub fn search(&self) -> &InputBuffer {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut InputBuffer {
        &mut self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search.set(text);
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    /// Select `id`, or clear the selection if it is already selected.
    pub fn toggle_category(&mut self, id: &str) {
        if self
            .category
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(id))
        {
            self.category = None;
        } else {
            self.category = Some(id.to_string());
        }
    }

    /// Step through no filter, then each catalogue category in order.
    pub fn cycle_category(&mut self) {
        let position = self.category.as_deref().and_then(|current| {
            CATEGORIES
                .iter()
                .position(|c| c.id.eq_ignore_ascii_case(current))
        });
        self.category = match position {
            None => Some(CATEGORIES[0].id.to_string()),
            Some(i) if i + 1 < CATEGORIES.len() => Some(CATEGORIES[i + 1].id.to_string()),
            Some(_) => None,
        };
    }

    /// Facts passing the current filters, in backend order.
    pub fn visible(&self) -> Vec<&Fact> {
        match self.facts() {
            Remote::Ready(facts) => filter_facts(facts, self.search.text(), self.category()),
            _ => Vec::new(),
        }
    }

    /// Count per catalogue category over the unfiltered list.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        let facts = self.facts().ready().map(Vec::as_slice).unwrap_or(&[]);
        CATEGORIES
            .iter()
            .map(|c| (*c, category_count(facts, c.id)))
            .collect()
    }

    pub fn summary(&self) -> String {
        match self.facts() {
            Remote::Pending => "Loading...".to_string(),
            Remote::Ready(facts) => {
                format!("{} of {} memories", self.visible().len(), facts.len())
            }
            Remote::Failed(reason) => format!("Could not load memories: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Fact> {
        vec![
            Fact::new("1", "Loves Rust", "preference"),
            Fact::new("2", "Ships v2", "project"),
        ]
    }

    fn loaded(facts: Vec<Fact>) -> MemoryBrowser {
        let ticket = Ticket::new(1, 0);
        let mut browser = MemoryBrowser::default();
        browser.begin_load(ticket);
        browser.apply_facts(ticket, Ok(facts));
        browser
    }

    fn ids(facts: Vec<&Fact>) -> Vec<&str> {
        facts.into_iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let facts = sample();
        for search in ["rust", "RUST", "Rust", "rUsT"] {
            assert_eq!(ids(filter_facts(&facts, search, None)), vec!["1"]);
        }
    }

    #[test]
    fn test_search_matches_category_text() {
        let facts = sample();
        assert_eq!(ids(filter_facts(&facts, "proj", None)), vec!["2"]);
    }

    #[test]
    fn test_category_filter() {
        let facts = sample();
        assert_eq!(ids(filter_facts(&facts, "", Some("project"))), vec!["2"]);
        assert_eq!(ids(filter_facts(&facts, "", Some("PROJECT"))), vec!["2"]);
        assert_eq!(ids(filter_facts(&facts, "", None)), vec!["1", "2"]);
    }

    #[test]
    fn test_unmatched_search_with_any_category_is_empty() {
        let facts = sample();
        assert!(filter_facts(&facts, "kotlin", None).is_empty());
        for category in CATEGORIES {
            assert!(filter_facts(&facts, "kotlin", Some(category.id)).is_empty());
        }
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let facts = sample();
        assert!(filter_facts(&facts, "rust", Some("project")).is_empty());
        assert_eq!(ids(filter_facts(&facts, "v2", Some("project"))), vec!["2"]);
    }

    #[test]
    fn test_browser_summary_and_counts() {
        let mut browser = loaded(sample());
        assert_eq!(browser.summary(), "2 of 2 memories");

        browser.set_search("rust");
        assert_eq!(browser.summary(), "1 of 2 memories");

        let counts = browser.category_counts();
        assert_eq!(counts[1], (CATEGORIES[1], 1));
        assert_eq!(counts[2], (CATEGORIES[2], 1));
        assert_eq!(counts[0].1, 0);
    }

    #[test]
    fn test_browser_pending_and_failed() {
        let browser = MemoryBrowser::default();
        assert_eq!(browser.summary(), "Loading...");
        assert!(browser.visible().is_empty());

        let ticket = Ticket::new(1, 0);
        let mut browser = MemoryBrowser::default();
        browser.begin_load(ticket);
        browser.apply_facts(ticket, Err(Error::Decode("expected array".into())));
        assert!(browser.summary().starts_with("Could not load memories"));
        assert!(browser.visible().is_empty());
    }

    #[test]
    fn test_toggle_and_cycle_category() {
        let mut browser = loaded(sample());
        browser.toggle_category("project");
        assert_eq!(browser.category(), Some("project"));
        browser.toggle_category("project");
        assert_eq!(browser.category(), None);

        let mut seen = Vec::new();
        for _ in 0..5 {
            browser.cycle_category();
            seen.push(browser.category().map(str::to_string));
        }
        assert_eq!(
            seen,
            vec![
                Some("goal".to_string()),
                Some("project".to_string()),
                Some("preference".to_string()),
                Some("other".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-05-01T10:30:00Z"), "2024-05-01 10:30");
        assert_eq!(format_timestamp("2024-05-01T10:30:00.123456"), "2024-05-01 10:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
