//! Memory browser fact list

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use memory_api::Fact;
use memory_core::views::format_timestamp;

use crate::ui::theme::Theme;

/// Facts rendered as a scrollable list, two lines per fact.
pub struct FactListWidget<'a> {
    facts: &'a [&'a Fact],
    offset: usize,
    theme: &'a Theme,
    title: String,
    empty_text: &'a str,
}

impl<'a> FactListWidget<'a> {
    pub fn new(facts: &'a [&'a Fact], theme: &'a Theme) -> Self {
        Self {
            facts,
            offset: 0,
            theme,
            title: " Memories ".to_string(),
            empty_text: "No memories found",
        }
    }

    /// Index of the first fact shown.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = format!(" {} ", title.into());
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }
}

impl Widget for FactListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.facts.is_empty() {
            Paragraph::new(Span::styled(self.empty_text, self.theme.system_style()))
                .render(inner, buf);
            return;
        }

        let offset = self.offset.min(self.facts.len() - 1);
        let capacity = (inner.height as usize / 2).max(1);
        let mut lines: Vec<Line> = Vec::new();

        for fact in self.facts.iter().skip(offset).take(capacity) {
            let color = self.theme.category_color(&fact.category);
            let mut meta = vec![Span::styled(
                format!("[{}]", fact.category),
                Style::default().fg(color),
            )];
            if let Some(ts) = &fact.timestamp {
                meta.push(Span::styled(
                    format!(" {}", format_timestamp(ts)),
                    self.theme.system_style(),
                ));
            }
            lines.push(Line::from(meta));
            lines.push(Line::from(Span::styled(
                format!("  {}", fact.content),
                self.theme.text_style(),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        let shown_end = (offset + capacity).min(self.facts.len());
        if shown_end < self.facts.len() {
            let hint = format!(" {}-{} of {} ", offset + 1, shown_end, self.facts.len());
            let y = area.y + area.height.saturating_sub(1);
            let x = area.x + area.width.saturating_sub(hint.chars().count() as u16 + 1);
            buf.set_string(x, y, hint, self.theme.system_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_category_and_content() {
        let theme = Theme::default();
        let facts = [
            Fact::new("1", "Prefers dark mode", "preference").with_timestamp("2024-05-01T10:30:00Z"),
            Fact::new("2", "Ship the CLI", "goal"),
        ];
        let refs: Vec<&Fact> = facts.iter().collect();
        let area = Rect::new(0, 0, 50, 8);
        let mut buf = Buffer::empty(area);
        FactListWidget::new(&refs, &theme).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("[preference] 2024-05-01 10:30"));
        assert!(text.contains("Prefers dark mode"));
        assert!(text.contains("[goal]"));
    }

    #[test]
    fn test_empty_list_shows_placeholder() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        FactListWidget::new(&[], &theme)
            .empty_text("Nothing here")
            .render(area, &mut buf);
        let row: String = (0..area.width).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("Nothing here"));
    }
}
