//! Chat transcript widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget, Wrap},
};

use memory_core::{Message, Role};

use crate::ui::theme::Theme;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Widget for displaying the chat transcript
pub struct TranscriptWidget<'a> {
    messages: &'a [Message],
    scroll: usize,
    theme: &'a Theme,
    focused: bool,
    thinking: Option<u8>,
}

impl<'a> TranscriptWidget<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            scroll: 0,
            theme,
            focused: false,
            thinking: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show a "Thinking..." line animated by `frame`.
    pub fn thinking(mut self, frame: Option<u8>) -> Self {
        self.thinking = frame;
        self
    }

    fn message_lines(&self, message: &Message, lines: &mut Vec<Line<'a>>) {
        match message.role {
            Role::User => {
                for (i, line) in message.content.lines().enumerate() {
                    let prefix = if i == 0 { "You: " } else { "     " };
                    lines.push(Line::from(Span::styled(
                        format!("{prefix}{line}"),
                        self.theme.user_style(),
                    )));
                }
            }
            Role::Assistant => {
                if let Some(reason) = &message.error {
                    lines.push(Line::from(Span::styled(
                        format!("! {reason}"),
                        self.theme.error_style(),
                    )));
                    return;
                }
                for line in message.content.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        self.theme.assistant_style(),
                    )));
                }
                if !message.facts.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "Sources:",
                        self.theme.source_style().add_modifier(Modifier::UNDERLINED),
                    )));
                    for fact in &message.facts {
                        lines.push(Line::from(vec![
                            Span::styled(
                                format!("  [{}] ", fact.category),
                                Style::default().fg(self.theme.category_color(&fact.category)),
                            ),
                            Span::styled(fact.content.clone(), self.theme.source_style()),
                        ]));
                    }
                }
            }
        }
    }
}

impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Chat [j/k scroll] "
        } else {
            " Chat "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        for message in self.messages {
            self.message_lines(message, &mut lines);
            lines.push(Line::from(""));
        }

        if let Some(frame) = self.thinking {
            let spin = SPINNER[frame as usize / 2 % SPINNER.len()];
            lines.push(Line::from(Span::styled(
                format!("{spin} Thinking..."),
                self.theme.system_style(),
            )));
        }

        // Last column is kept for the scrollbar
        let text_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

        // Count wrapped rows, not logical lines
        let visible_height = inner.height as usize;
        let total_lines = paragraph.line_count(text_area.width);
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        paragraph
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .render(text_area, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let hint = format!(" ↓{} more ", max_scroll - scroll);
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_api::Fact;

    fn rendered(widget: TranscriptWidget, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_answer_and_sources() {
        let theme = Theme::default();
        let messages = vec![
            Message::user("what am I building?"),
            Message::assistant("A CLI", vec![Fact::new("1", "Builds a CLI", "project")]),
        ];
        let text = rendered(TranscriptWidget::new(&messages, &theme), 50, 12);
        assert!(text.contains("You: what am I building?"));
        assert!(text.contains("A CLI"));
        assert!(text.contains("Sources:"));
        assert!(text.contains("[project] Builds a CLI"));
    }

    #[test]
    fn test_bottom_scroll_reaches_end_of_wrapped_answer() {
        let theme = Theme::default();
        let answer = format!("{}TAILWORD", "word ".repeat(30));
        let messages = vec![Message::user("tell me"), Message::assistant(answer, Vec::new())];
        let text = rendered(
            TranscriptWidget::new(&messages, &theme).scroll(usize::MAX / 2),
            20,
            6,
        );
        assert!(text.contains("TAILWORD"));
    }

    #[test]
    fn test_failed_answer_and_thinking() {
        let theme = Theme::default();
        let messages = vec![Message::user("hi"), Message::failed("backend down")];
        let text = rendered(
            TranscriptWidget::new(&messages, &theme).thinking(Some(0)),
            40,
            10,
        );
        assert!(text.contains("! backend down"));
        assert!(text.contains("Thinking..."));
    }
}
