//! Event handling for the memory TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use memory_core::Page;

use crate::app::{App, InputMode};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if app.showing_help() {
        return handle_help_key(app, key);
    }

    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (page switching and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('i') => {
            app.enter_insert_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,

        // Pages
        KeyCode::Char(c @ '1'..='5') => {
            let index = (c as usize) - ('1' as usize);
            if let Some(page) = Page::ALL.get(index) {
                app.navigate(*page);
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.navigate(app.page().next());
            EventResult::NeedsRedraw
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.navigate(app.page().prev());
            EventResult::NeedsRedraw
        }

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
            EventResult::NeedsRedraw
        }

        _ => handle_page_hotkeys(app, key),
    }
}

fn handle_page_hotkeys(app: &mut App, key: KeyEvent) -> EventResult {
    match (app.page(), key.code) {
        (Page::Landing, KeyCode::Enter) => {
            app.navigate(Page::Import);
            EventResult::NeedsRedraw
        }
        (Page::Chat, KeyCode::Char(c @ 'a'..='d')) => {
            app.use_suggestion((c as usize) - ('a' as usize));
            EventResult::NeedsRedraw
        }
        (Page::Import, KeyCode::Char('t')) => {
            app.toggle_import_source();
            EventResult::NeedsRedraw
        }
        (Page::Import, KeyCode::Char('s')) => {
            app.submit_import();
            EventResult::NeedsRedraw
        }
        (Page::Memory, KeyCode::Char('/')) => {
            app.enter_insert_mode();
            EventResult::NeedsRedraw
        }
        (Page::Memory, KeyCode::Tab) => {
            app.cycle_category();
            EventResult::NeedsRedraw
        }
        (Page::Dashboard | Page::Memory, KeyCode::Char('r')) => {
            app.reload();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys in INSERT mode (free text input)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.enter_normal_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            app.submit();
            EventResult::NeedsRedraw
        }

        KeyCode::Left => {
            app.edit(|input| input.left());
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.edit(|input| input.right());
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.edit(|input| input.home());
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.edit(|input| input.end());
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.edit(|input| input.backspace());
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.edit(|input| input.delete());
            EventResult::NeedsRedraw
        }
        KeyCode::Up => {
            app.edit(|input| input.history_prev());
            EventResult::NeedsRedraw
        }
        KeyCode::Down => {
            app.edit(|input| input.history_next());
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            app.edit(|input| input.insert(c));
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_help();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::{MockBackend, Router, RouterConfig};
    use std::sync::Arc;

    fn app() -> App {
        let mock = MockBackend::new();
        App::new(Router::new(Arc::new(mock), RouterConfig::default()))
    }

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[tokio::test]
    async fn test_number_keys_switch_pages() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.page(), Page::Chat);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.page(), Page::Memory);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.page(), Page::Landing);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_event(&mut app, Event::Key(ctrl_c)), EventResult::Quit);
    }

    #[tokio::test]
    async fn test_insert_mode_types_into_page_field() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Insert);

        // Digits and 'q' are text in insert mode.
        for c in "q1?".chars() {
            assert_ne!(press(&mut app, KeyCode::Char(c)), EventResult::Quit);
        }
        assert_eq!(app.page(), Page::Chat);
        assert_eq!(app.active_input().map(|i| i.text()), Some("q1?"));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_memory_search_filters_live() {
        let mut app = app();
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('/'));
        for c in "rust".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let browser = app.router.memory().unwrap();
        assert_eq!(browser.search().text(), "rust");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.router.memory().unwrap().category(), Some("goal"));
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.showing_help());

        assert_eq!(press(&mut app, KeyCode::Char('3')), EventResult::Continue);
        assert_eq!(app.page(), Page::Landing);

        press(&mut app, KeyCode::Esc);
        assert!(!app.showing_help());
    }

    #[tokio::test]
    async fn test_import_toggle_source_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(
            app.router.import_form().unwrap().source(),
            memory_api::ImportSource::Claude
        );
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.status_message(), Some("choose a file to import first"));
    }
}
