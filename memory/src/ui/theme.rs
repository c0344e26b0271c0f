//! Color theme and styling for the memory TUI

use ratatui::style::{Color, Modifier, Style};

/// UI color theme
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,

    // Transcript colors
    pub user_text: Color,
    pub assistant_text: Color,
    pub source_text: Color,
    pub error_text: Color,
    pub system_text: Color,

    // Category colors
    pub goal: Color,
    pub project: Color,
    pub preference: Color,
    pub other: Color,

    // Backend status colors
    pub online: Color,
    pub offline: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            accent: Color::LightBlue,

            user_text: Color::Cyan,
            assistant_text: Color::White,
            source_text: Color::Gray,
            error_text: Color::LightRed,
            system_text: Color::DarkGray,

            goal: Color::LightGreen,
            project: Color::LightBlue,
            preference: Color::LightMagenta,
            other: Color::Gray,

            online: Color::Green,
            offline: Color::Red,
        }
    }
}

impl Theme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn user_style(&self) -> Style {
        Style::default()
            .fg(self.user_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn assistant_style(&self) -> Style {
        Style::default().fg(self.assistant_text)
    }

    pub fn source_style(&self) -> Style {
        Style::default()
            .fg(self.source_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Color for a fact category; unknown categories share the "other" color.
    pub fn category_color(&self, category: &str) -> Color {
        match category.to_lowercase().as_str() {
            "goal" => self.goal,
            "project" => self.project,
            "preference" => self.preference,
            _ => self.other,
        }
    }

    pub fn category_style(&self, category: &str, selected: bool) -> Style {
        let style = Style::default().fg(self.category_color(category));
        if selected {
            style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            style
        }
    }

    pub fn backend_style(&self, label: &str) -> Style {
        let color = match label {
            "online" => self.online,
            "offline" => self.offline,
            _ => self.system_text,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(self.system_text)
        }
    }
}
