//! Page routing and request dispatch.
//!
//! The router owns the mounted view and that view's [`RequestScope`]. Views
//! ask for backend calls through the router; each call runs as a task in the
//! scope and reports back over a channel as a [`Completion`]. The UI loop
//! feeds completions back with [`Router::drain`] (non-blocking) or
//! [`Router::settle`] (awaits everything in flight).
//!
//! Navigating to another page drops the old view and aborts its requests.
//! Completions tagged with a retired mount are discarded.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use memory_api::{
    Error, Fact, HealthResponse, ImportAck, ImportSource, QueryResponse, StatsResponse, Upload,
};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::MemoryBackend;
use crate::task::{RequestScope, Ticket};
use crate::views::import::read_upload;
use crate::views::memory::DEFAULT_PAGE_SIZE;
use crate::views::{ChatView, Dashboard, ImportForm, ImportRejected, MemoryBrowser, SubmitRejected};

// ============================================================================
// Pages and views
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Dashboard,
    Chat,
    Import,
    Memory,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Landing,
        Page::Dashboard,
        Page::Chat,
        Page::Import,
        Page::Memory,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Landing => "Home",
            Page::Dashboard => "Dashboard",
            Page::Chat => "Chat",
            Page::Import => "Import",
            Page::Memory => "Memory",
        }
    }

    /// Position in [`Page::ALL`].
    pub fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn prev(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// State of the mounted page.
#[derive(Debug)]
pub enum View {
    Landing,
    Dashboard(Dashboard),
    Chat(ChatView),
    Import(ImportForm),
    Memory(MemoryBrowser),
}

impl View {
    pub fn page(&self) -> Page {
        match self {
            View::Landing => Page::Landing,
            View::Dashboard(_) => Page::Dashboard,
            View::Chat(_) => Page::Chat,
            View::Import(_) => Page::Import,
            View::Memory(_) => Page::Memory,
        }
    }
}

// ============================================================================
// Completions and errors
// ============================================================================

/// Result of one backend call.
#[derive(Debug)]
pub enum Outcome {
    Stats(Result<StatsResponse, Error>),
    Health(Result<HealthResponse, Error>),
    Facts(Result<Vec<Fact>, Error>),
    Query(Result<QueryResponse, Error>),
    Import(Result<ImportAck, Error>),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Stats(_) => "stats",
            Outcome::Health(_) => "health",
            Outcome::Facts(_) => "facts",
            Outcome::Query(_) => "query",
            Outcome::Import(_) => "import",
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not available on the {current} page (open {expected})")]
    WrongPage { expected: Page, current: Page },

    #[error(transparent)]
    Chat(#[from] SubmitRejected),

    #[error(transparent)]
    Import(#[from] ImportRejected),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// How many facts the memory browser requests on mount.
    pub facts_page_size: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            facts_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub struct Router {
    backend: Arc<dyn MemoryBackend>,
    config: RouterConfig,
    view: View,
    scope: RequestScope,
    mounts: u64,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl Router {
    /// Create a router showing the landing page.
    pub fn new(backend: Arc<dyn MemoryBackend>, config: RouterConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            config,
            view: View::Landing,
            scope: RequestScope::new(1),
            mounts: 1,
            tx,
            rx,
        }
    }

    pub fn backend(&self) -> &Arc<dyn MemoryBackend> {
        &self.backend
    }

    pub fn config(&self) -> RouterConfig {
        self.config
    }

    pub fn page(&self) -> Page {
        self.view.page()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Generation of the mounted view.
    pub fn mount_id(&self) -> u64 {
        self.scope.mount()
    }

    /// Requests of the mounted view still running.
    pub fn in_flight(&self) -> usize {
        self.scope.in_flight()
    }

    /// Show `page`. Navigating to the page already shown does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page() {
            return;
        }

        let cancelled = self.scope.cancel_all();
        self.mounts += 1;
        self.scope = RequestScope::new(self.mounts);
        tracing::debug!(from = %self.page(), to = %page, mount = self.mounts, cancelled, "navigate");

        self.view = match page {
            Page::Landing => View::Landing,
            Page::Dashboard => View::Dashboard(Dashboard::new()),
            Page::Chat => View::Chat(ChatView::new()),
            Page::Import => View::Import(ImportForm::new()),
            Page::Memory => View::Memory(MemoryBrowser::new(self.config.facts_page_size)),
        };
        self.load();
    }

    /// Fetch the mounted view's data again. Returns false for pages with
    /// nothing to fetch.
    pub fn reload(&mut self) -> bool {
        self.load()
    }

    fn load(&mut self) -> bool {
        let Self {
            backend,
            view,
            scope,
            tx,
            ..
        } = self;

        match view {
            View::Dashboard(dashboard) => {
                let ticket = dispatch(scope, tx, backend, |b| async move {
                    Outcome::Stats(b.stats().await)
                });
                dashboard.begin_stats(ticket);
                let ticket = dispatch(scope, tx, backend, |b| async move {
                    Outcome::Health(b.health().await)
                });
                dashboard.begin_health(ticket);
                true
            }
            View::Memory(browser) => {
                let limit = browser.page_size();
                let ticket = dispatch(scope, tx, backend, move |b| async move {
                    Outcome::Facts(b.facts(limit, 0).await)
                });
                browser.begin_load(ticket);
                true
            }
            _ => false,
        }
    }

    /// Submit the chat input as a query.
    pub fn submit_chat(&mut self) -> Result<Ticket, ActionError> {
        let current = self.page();
        let Self {
            backend,
            view,
            scope,
            tx,
            ..
        } = self;

        let View::Chat(chat) = view else {
            return Err(ActionError::WrongPage {
                expected: Page::Chat,
                current,
            });
        };
        let ticket = chat.submit(|text| {
            dispatch(scope, tx, backend, move |b| async move {
                Outcome::Query(b.query(&text).await)
            })
        })?;
        Ok(ticket)
    }

    /// Load the file at `path` into the import form.
    pub async fn choose_import_file(&mut self, path: impl AsRef<Path>) -> Result<(), ActionError> {
        if self.import_form().is_none() {
            return Err(self.wrong_page(Page::Import));
        }
        let upload = read_upload(path).await?;
        match self.import_form_mut() {
            Some(form) => Ok(form.select_file(upload)?),
            None => Err(self.wrong_page(Page::Import)),
        }
    }

    pub fn set_import_source(&mut self, source: ImportSource) -> Result<(), ActionError> {
        match self.import_form_mut() {
            Some(form) => Ok(form.set_source(source)?),
            None => Err(self.wrong_page(Page::Import)),
        }
    }

    /// Submit the import form.
    pub fn submit_import(&mut self) -> Result<Ticket, ActionError> {
        let current = self.page();
        let Self {
            backend,
            view,
            scope,
            tx,
            ..
        } = self;

        let View::Import(form) = view else {
            return Err(ActionError::WrongPage {
                expected: Page::Import,
                current,
            });
        };
        let ticket = form.submit(|upload: Upload, source| {
            dispatch(scope, tx, backend, move |b| async move {
                Outcome::Import(b.import_data(upload, source).await)
            })
        })?;
        Ok(ticket)
    }

    /// Hand a completion to the view that asked for it.
    ///
    /// Returns false when the completion was discarded: its mount has been
    /// retired, or the view no longer waits on that ticket.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let Completion { ticket, outcome } = completion;
        if ticket.mount() != self.scope.mount() {
            tracing::debug!(
                ?ticket,
                kind = outcome.kind(),
                mount = self.scope.mount(),
                "discarding completion from a retired view"
            );
            return false;
        }
        self.scope.finish(ticket);

        match (&mut self.view, outcome) {
            (View::Dashboard(dashboard), Outcome::Stats(result)) => {
                dashboard.apply_stats(ticket, result)
            }
            (View::Dashboard(dashboard), Outcome::Health(result)) => {
                dashboard.apply_health(ticket, result)
            }
            (View::Memory(browser), Outcome::Facts(result)) => browser.apply_facts(ticket, result),
            (View::Chat(chat), Outcome::Query(result)) => chat.apply_response(ticket, result),
            (View::Import(form), Outcome::Import(result)) => form.apply_result(ticket, result),
            (view, outcome) => {
                tracing::warn!(
                    ?ticket,
                    kind = outcome.kind(),
                    page = %view.page(),
                    "completion does not belong to the mounted view"
                );
                false
            }
        }
    }

    /// Apply every completion already delivered. Never blocks.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until the mounted view has no request left in flight, applying
    /// completions as they arrive.
    pub async fn settle(&mut self) -> usize {
        let mut applied = self.drain();
        while self.scope.in_flight() > 0 {
            match self.rx.recv().await {
                Some(completion) => {
                    if self.apply(completion) {
                        applied += 1;
                    }
                }
                None => break,
            }
        }
        applied + self.drain()
    }

    // ------------------------------------------------------------------------
    // View accessors
    // ------------------------------------------------------------------------

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.view {
            View::Dashboard(dashboard) => Some(dashboard),
            _ => None,
        }
    }

    pub fn chat(&self) -> Option<&ChatView> {
        match &self.view {
            View::Chat(chat) => Some(chat),
            _ => None,
        }
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatView> {
        match &mut self.view {
            View::Chat(chat) => Some(chat),
            _ => None,
        }
    }

    pub fn import_form(&self) -> Option<&ImportForm> {
        match &self.view {
            View::Import(form) => Some(form),
            _ => None,
        }
    }

    pub fn import_form_mut(&mut self) -> Option<&mut ImportForm> {
        match &mut self.view {
            View::Import(form) => Some(form),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemoryBrowser> {
        match &self.view {
            View::Memory(browser) => Some(browser),
            _ => None,
        }
    }

    pub fn memory_mut(&mut self) -> Option<&mut MemoryBrowser> {
        match &mut self.view {
            View::Memory(browser) => Some(browser),
            _ => None,
        }
    }

    fn wrong_page(&self, expected: Page) -> ActionError {
        ActionError::WrongPage {
            expected,
            current: self.page(),
        }
    }
}

/// Spawn `call` in `scope`, sending its outcome back tagged with its ticket.
fn dispatch<F, Fut>(
    scope: &mut RequestScope,
    tx: &UnboundedSender<Completion>,
    backend: &Arc<dyn MemoryBackend>,
    call: F,
) -> Ticket
where
    F: FnOnce(Arc<dyn MemoryBackend>) -> Fut,
    Fut: std::future::Future<Output = Outcome> + Send + 'static,
{
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    scope.spawn(move |ticket| {
        let request = call(backend);
        async move {
            let outcome = request.await;
            tracing::debug!(?ticket, kind = outcome.kind(), "request finished");
            // The receiver lives as long as the router.
            let _ = tx.send(Completion { ticket, outcome });
        }
    })
}
