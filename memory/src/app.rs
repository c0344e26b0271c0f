//! Main application state and logic

use memory_api::ImportSource;
use memory_core::{ActionError, InputBuffer, Page, Router};

use crate::ui::theme::Theme;

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - page switching and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - typing into the page's text field
    Insert,
}

/// Main application state
pub struct App {
    pub router: Router,
    backend_url: String,

    // UI state
    pub theme: Theme,
    pub input_mode: InputMode,
    show_help: bool,

    // Scrolling
    pub transcript_scroll: usize,
    pub scroll_locked_to_bottom: bool,
    pub fact_offset: usize,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Import path typed on the import page, loaded by the event loop
    pending_path: Option<String>,

    // Animation
    pub animation_frame: u8,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            backend_url: String::new(),
            theme: Theme::default(),
            input_mode: InputMode::Normal,
            show_help: false,
            transcript_scroll: 0,
            scroll_locked_to_bottom: true,
            fact_offset: 0,
            status_message: None,
            should_quit: false,
            pending_path: None,
            animation_frame: 0,
        }
    }

    /// Backend address shown in the status bar.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn page(&self) -> Page {
        self.router.page()
    }

    /// Switch pages. Leaving a page drops its state.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page() {
            return;
        }
        self.router.navigate(page);
        self.input_mode = InputMode::Normal;
        self.transcript_scroll = 0;
        self.scroll_locked_to_bottom = true;
        self.fact_offset = 0;
        self.pending_path = None;
        self.clear_status();
    }

    /// Apply finished requests. Called once per frame.
    pub fn sync(&mut self) -> usize {
        let applied = self.router.drain();
        if applied > 0 && self.page() == Page::Chat && self.scroll_locked_to_bottom {
            self.scroll_to_bottom();
        }
        applied
    }

    // =========================================================================
    // Text input
    // =========================================================================

    /// The text field of the current page, if it has one.
    pub fn active_input(&self) -> Option<&InputBuffer> {
        match self.page() {
            Page::Chat => self.router.chat().map(|chat| chat.input()),
            Page::Import => self.router.import_form().map(|form| form.path()),
            Page::Memory => self.router.memory().map(|browser| browser.search()),
            Page::Landing | Page::Dashboard => None,
        }
    }

    /// Mutable text field of the current page. None while the page is
    /// waiting on a request that locks the field.
    pub fn active_input_mut(&mut self) -> Option<&mut InputBuffer> {
        match self.page() {
            Page::Chat => self.router.chat_mut().and_then(|chat| chat.input_mut()),
            Page::Import => self.router.import_form_mut().and_then(|form| form.path_mut()),
            Page::Memory => self.router.memory_mut().map(|browser| browser.search_mut()),
            Page::Landing | Page::Dashboard => None,
        }
    }

    pub fn enter_insert_mode(&mut self) {
        if matches!(self.page(), Page::Landing | Page::Dashboard) {
            self.set_status("Nothing to type on this page");
            return;
        }
        if self.active_input_mut().is_none() {
            self.set_status("Busy, wait for the current request to finish");
            return;
        }
        self.input_mode = InputMode::Insert;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Apply an edit to the active text field.
    pub fn edit(&mut self, f: impl FnOnce(&mut InputBuffer)) {
        let on_memory = self.page() == Page::Memory;
        if let Some(input) = self.active_input_mut() {
            f(input);
            if on_memory {
                // The visible list changed under the cursor.
                self.fact_offset = 0;
            }
        }
    }

    /// Handle Enter in insert mode.
    pub fn submit(&mut self) {
        match self.page() {
            Page::Chat => self.submit_chat(),
            Page::Import => {
                let path = self
                    .active_input_mut()
                    .and_then(|input| input.submit())
                    .map(|path| path.trim().to_string())
                    .filter(|path| !path.is_empty());
                match path {
                    Some(path) => {
                        self.set_status(format!("Loading {path}..."));
                        self.pending_path = Some(path);
                    }
                    None => self.set_status("Type the path of an export file"),
                }
                self.enter_normal_mode();
            }
            Page::Memory => self.enter_normal_mode(),
            Page::Landing | Page::Dashboard => {}
        }
    }

    fn submit_chat(&mut self) {
        match self.router.submit_chat() {
            Ok(_) => {
                self.set_status("Thinking...");
                self.scroll_to_bottom();
            }
            Err(e) => self.report(e),
        }
    }

    /// Copy a suggested prompt into the chat input.
    pub fn use_suggestion(&mut self, index: usize) {
        let used = self
            .router
            .chat_mut()
            .is_some_and(|chat| chat.transcript().is_empty() && chat.use_suggestion(index));
        if used {
            self.input_mode = InputMode::Insert;
        }
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Path typed on the import page and not yet loaded.
    pub fn take_pending_path(&mut self) -> Option<String> {
        self.pending_path.take()
    }

    pub async fn load_import_file(&mut self, path: String) {
        match self.router.choose_import_file(&path).await {
            Ok(()) => {
                let line = self
                    .router
                    .import_form()
                    .map(|form| form.status_line())
                    .unwrap_or_default();
                self.set_status(line);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_import_source(&mut self) {
        let next = match self.router.import_form().map(|form| form.source()) {
            Some(ImportSource::ChatGpt) => ImportSource::Claude,
            Some(ImportSource::Claude) => ImportSource::ChatGpt,
            None => return,
        };
        match self.router.set_import_source(next) {
            Ok(()) => self.set_status(format!("Provider: {}", next.label())),
            Err(e) => self.report(e),
        }
    }

    pub fn submit_import(&mut self) {
        match self.router.submit_import() {
            Ok(_) => self.set_status("Importing..."),
            Err(e) => self.report(e),
        }
    }

    // =========================================================================
    // Memory browser
    // =========================================================================

    pub fn cycle_category(&mut self) {
        if let Some(browser) = self.router.memory_mut() {
            browser.cycle_category();
            let label = browser.category().unwrap_or("all").to_string();
            self.fact_offset = 0;
            self.set_status(format!("Category: {label}"));
        }
    }

    pub fn reload(&mut self) {
        if self.router.reload() {
            self.fact_offset = 0;
            self.set_status("Reloading...");
        }
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    pub fn scroll_to_bottom(&mut self) {
        // The widget caps this to the real maximum.
        self.transcript_scroll = usize::MAX / 2;
        self.scroll_locked_to_bottom = true;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        match self.page() {
            Page::Memory => self.fact_offset = self.fact_offset.saturating_sub(lines),
            _ => {
                let max = self.estimate_max_scroll();
                if self.transcript_scroll > max {
                    self.transcript_scroll = max;
                }
                self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
                self.scroll_locked_to_bottom = false;
            }
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        match self.page() {
            Page::Memory => {
                let visible = self
                    .router
                    .memory()
                    .map(|browser| browser.visible().len())
                    .unwrap_or(0);
                self.fact_offset = (self.fact_offset + lines).min(visible.saturating_sub(1));
            }
            _ => {
                let max = self.estimate_max_scroll();
                self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(max);
                if self.transcript_scroll >= max {
                    self.scroll_locked_to_bottom = true;
                }
            }
        }
    }

    /// Conservative line count estimate, assuming ~60 columns of text.
    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;
        const ESTIMATED_VISIBLE_HEIGHT: usize = 20;

        let Some(chat) = self.router.chat() else {
            return 0;
        };
        let lines: usize = chat
            .transcript()
            .iter()
            .map(|message| {
                message
                    .content
                    .lines()
                    .map(|line| (line.len() / ESTIMATED_WIDTH).max(1))
                    .sum::<usize>()
                    + message.facts.len()
                    + 2
            })
            .sum();
        lines.saturating_sub(ESTIMATED_VISIBLE_HEIGHT)
    }

    // =========================================================================
    // Help, status, ticks
    // =========================================================================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    pub fn showing_help(&self) -> bool {
        self.show_help
    }

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Set status message (always overwrites)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn report(&mut self, error: ActionError) {
        tracing::debug!(%error, "action rejected");
        self.set_status(error.to_string());
    }
}
