//! Status bar and hotkey bar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use memory_core::Page;

use crate::app::InputMode;
use crate::ui::theme::Theme;

/// Mode indicator, backend address and the latest status message
pub struct StatusBarWidget<'a> {
    page: Page,
    input_mode: InputMode,
    backend_url: &'a str,
    in_flight: usize,
    message: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(page: Page, input_mode: InputMode, theme: &'a Theme) -> Self {
        Self {
            page,
            input_mode,
            backend_url: "",
            in_flight: 0,
            message: None,
            theme,
        }
    }

    pub fn backend_url(mut self, url: &'a str) -> Self {
        self.backend_url = url;
        self
    }

    pub fn in_flight(mut self, count: usize) -> Self {
        self.in_flight = count;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (mode_text, mode_color) = match self.input_mode {
            InputMode::Normal => (" NORMAL ", Color::Blue),
            InputMode::Insert => (" INSERT ", Color::Green),
        };

        let mut spans = vec![
            Span::styled(
                mode_text,
                Style::default()
                    .fg(Color::Black)
                    .bg(mode_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(self.page.title(), self.theme.title_style(true)),
            Span::raw(" | "),
            Span::styled(self.backend_url, self.theme.system_style()),
        ];

        if self.in_flight > 0 {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("{} pending", self.in_flight),
                Style::default().fg(Color::Yellow),
            ));
        }

        if let Some(message) = self.message {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(message, self.theme.text_style()));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        Paragraph::new(Line::from(spans)).block(block).render(area, buf);
    }
}

/// One-line hint of the keys that work right now
pub struct HotkeyBarWidget<'a> {
    page: Page,
    input_mode: InputMode,
    theme: &'a Theme,
}

impl<'a> HotkeyBarWidget<'a> {
    pub fn new(page: Page, input_mode: InputMode, theme: &'a Theme) -> Self {
        Self {
            page,
            input_mode,
            theme,
        }
    }

    fn hotkeys(&self) -> Vec<(&'static str, &'static str)> {
        if self.input_mode == InputMode::Insert {
            return match self.page {
                Page::Memory => vec![("Enter/Esc", "done")],
                _ => vec![("Enter", "submit"), ("Esc", "cancel"), ("↑/↓", "history")],
            };
        }

        let mut keys = match self.page {
            Page::Landing => vec![("Enter", "import")],
            Page::Dashboard => vec![("r", "refresh")],
            Page::Chat => vec![("i", "ask"), ("a-d", "suggestion"), ("j/k", "scroll")],
            Page::Import => vec![("i", "path"), ("t", "provider"), ("s", "import")],
            Page::Memory => vec![("/", "search"), ("Tab", "category"), ("r", "refresh"), ("j/k", "scroll")],
        };
        keys.extend([("1-5", "pages"), ("?", "help"), ("q", "quit")]);
        keys
    }
}

impl Widget for HotkeyBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        for (i, (key, action)) in self.hotkeys().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(key, key_style));
            spans.push(Span::styled(format!(" {action}"), self.theme.system_style()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_mode_hides_page_keys() {
        let theme = Theme::default();
        let bar = HotkeyBarWidget::new(Page::Chat, InputMode::Insert, &theme);
        let keys: Vec<_> = bar.hotkeys().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"Enter"));
        assert!(!keys.contains(&"q"));
    }

    #[test]
    fn test_normal_mode_lists_page_keys() {
        let theme = Theme::default();
        let bar = HotkeyBarWidget::new(Page::Import, InputMode::Normal, &theme);
        let keys: Vec<_> = bar.hotkeys().into_iter().map(|(k, _)| k).collect();
        assert_eq!(&keys[..3], &["i", "t", "s"]);
        assert!(keys.contains(&"q"));
    }
}
