//! Render orchestration for the memory TUI

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use memory_api::ImportSource;
use memory_core::{views::SUGGESTED_PROMPTS, Dashboard, ImportForm, ImportStatus, MemoryBrowser, Page};

use crate::app::{App, InputMode};
use crate::ui::layout::{centered_rect_fixed, with_input_box, AppLayout};
use crate::ui::widgets::{
    FactListWidget, HotkeyBarWidget, InputWidget, StatusBarWidget, TranscriptWidget,
};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_tab_bar(frame, app, layout.tab_bar);

    match app.page() {
        Page::Landing => render_landing(frame, app, layout.body),
        Page::Dashboard => {
            if let Some(dashboard) = app.router.dashboard() {
                render_dashboard(frame, app, dashboard, layout.body);
            }
        }
        Page::Chat => render_chat(frame, app, layout.body),
        Page::Import => {
            if let Some(form) = app.router.import_form() {
                render_import(frame, app, form, layout.body);
            }
        }
        Page::Memory => {
            if let Some(browser) = app.router.memory() {
                render_memory(frame, app, browser, layout.body);
            }
        }
    }

    render_status_bar(frame, app, layout.status_bar);
    frame.render_widget(
        HotkeyBarWidget::new(app.page(), app.input_mode, &app.theme),
        layout.hotkey_bar,
    );

    if app.showing_help() {
        render_help_overlay(frame, app, area);
    }
}

fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " Memory ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for page in Page::ALL {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{} {}", page.index() + 1, page.title()),
            app.theme.tab_style(page == app.page()),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_landing(frame: &mut Frame, app: &App, area: Rect) {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let dim = app.theme.system_style();

    let feature = |key: &'static str, title: &'static str, text: &'static str| {
        vec![
            Line::from(vec![
                Span::styled(format!("[{key}] "), Style::default().fg(app.theme.accent)),
                Span::styled(title, heading),
            ]),
            Line::from(Span::styled(text, dim)),
            Line::from(""),
        ]
    };

    let mut lines = vec![
        Line::from(Span::styled("Unified LLM Workspace", dim)),
        Line::from(""),
        Line::from(Span::styled(
            "Your AI Memory Center",
            heading.fg(app.theme.accent),
        )),
        Line::from("One unified memory for ChatGPT, Claude, and Gemini."),
        Line::from("Store, retrieve, and query your digital brain."),
        Line::from(""),
    ];
    lines.extend(feature(
        "4",
        "Import Data",
        "Add conversations from ChatGPT, Claude, and other providers.",
    ));
    lines.extend(feature(
        "3",
        "Chat",
        "Ask questions and get answers based on your unified memory.",
    ));
    lines.extend(feature(
        "5",
        "Memory Bank",
        "Explore, search, and manage your extracted facts.",
    ));
    lines.push(Line::from(Span::styled(
        "Press Enter to import your first export",
        dim,
    )));

    let popup = centered_rect_fixed(70, lines.len() as u16 + 2, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(false));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn render_dashboard(frame: &mut Frame, app: &App, dashboard: &Dashboard, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);
    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    let stat_box = |title: &'static str, value: String, style: Style| {
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(value, style.add_modifier(Modifier::BOLD))),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(false)),
        )
    };

    let backend = dashboard.backend_label();
    frame.render_widget(
        stat_box("Total Memories", dashboard.total_facts_label(), app.theme.text_style()),
        boxes[0],
    );
    frame.render_widget(
        stat_box("Storage Type", dashboard.storage_type_label(), app.theme.text_style()),
        boxes[1],
    );
    frame.render_widget(
        stat_box("Status", backend.to_string(), app.theme.backend_style(backend)),
        boxes[2],
    );

    let mut details = Vec::new();
    if let Some(index) = dashboard.index_name() {
        details.push(Line::from(vec![
            Span::styled("Index: ", app.theme.system_style()),
            Span::raw(index.to_string()),
        ]));
    }
    if let Some(error) = dashboard.error() {
        details.push(Line::from(Span::styled(
            format!("Could not load stats: {error}"),
            app.theme.error_style(),
        )));
    }
    details.push(Line::from(Span::styled("Press r to refresh", app.theme.system_style())));
    frame.render_widget(Paragraph::new(details).wrap(Wrap { trim: false }), rows[1]);
}

fn render_chat(frame: &mut Frame, app: &App, area: Rect) {
    let Some(chat) = app.router.chat() else {
        return;
    };
    let (main, input_area) = with_input_box(area);

    if chat.transcript().is_empty() {
        let mut lines = vec![
            Line::from(Span::styled(
                "Ask anything about your memories",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
            let key = (b'a' + i as u8) as char;
            lines.push(Line::from(vec![
                Span::styled(format!("  {key}  "), Style::default().fg(app.theme.accent)),
                Span::raw(*prompt),
            ]));
        }
        let block = Block::default()
            .title(" Chat ")
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(false));
        frame.render_widget(Paragraph::new(lines).block(block), main);
    } else {
        let thinking = chat.is_awaiting().then_some(app.animation_frame);
        let transcript = TranscriptWidget::new(chat.transcript(), &app.theme)
            .scroll(app.transcript_scroll)
            .focused(app.input_mode == InputMode::Normal)
            .thinking(thinking);
        frame.render_widget(transcript, main);
    }

    let placeholder = if chat.is_awaiting() {
        "Waiting for an answer..."
    } else {
        "Press i to ask a question"
    };
    let input = InputWidget::new(chat.input().text(), &app.theme)
        .cursor_position(chat.input().cursor())
        .title("Ask")
        .placeholder(placeholder)
        .active(app.input_mode == InputMode::Insert);
    frame.render_widget(input, input_area);
}

fn render_import(frame: &mut Frame, app: &App, form: &ImportForm, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let mut providers = vec![Span::styled("Provider: ", app.theme.system_style())];
    for source in ImportSource::ALL {
        let selected = source == form.source();
        let style = if selected {
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            app.theme.system_style()
        };
        providers.push(Span::styled(format!(" {} ", source.label()), style));
        providers.push(Span::raw(" "));
    }
    providers.push(Span::styled("(t to switch)", app.theme.system_style()));
    frame.render_widget(
        Paragraph::new(Line::from(providers)).block(
            Block::default()
                .title(" Import Data ")
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(false)),
        ),
        rows[0],
    );

    let input = InputWidget::new(form.path().text(), &app.theme)
        .cursor_position(form.path().cursor())
        .title("Export file")
        .prompt("")
        .placeholder("Press i and type the path to conversations.json")
        .active(app.input_mode == InputMode::Insert);
    frame.render_widget(input, rows[1]);

    let status_style = match form.status() {
        ImportStatus::Idle => app.theme.text_style(),
        ImportStatus::Pending(_) => app.theme.system_style(),
        ImportStatus::Succeeded(_) => app.theme.backend_style("online"),
        ImportStatus::Failed(_) => app.theme.error_style(),
    };
    let mut lines = vec![Line::from(Span::styled(form.status_line(), status_style))];
    if form.can_submit() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Press s to start the import", app.theme.system_style())));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Status ")
                    .borders(Borders::ALL)
                    .border_style(app.theme.border_style(false)),
            ),
        rows[2],
    );
}

fn render_memory(frame: &mut Frame, app: &App, browser: &MemoryBrowser, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let search = InputWidget::new(browser.search().text(), &app.theme)
        .cursor_position(browser.search().cursor())
        .title("Search")
        .prompt("/ ")
        .placeholder("Press / to search memories")
        .active(app.input_mode == InputMode::Insert);
    frame.render_widget(search, rows[0]);

    let mut categories = vec![Span::styled(
        " All ",
        if browser.category().is_none() {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            app.theme.system_style()
        },
    )];
    for (category, count) in browser.category_counts() {
        let selected = browser.category() == Some(category.id);
        categories.push(Span::raw(" "));
        categories.push(Span::styled(
            format!(" {} ({count}) ", category.label),
            app.theme.category_style(category.id, selected),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(categories)), rows[1]);

    let visible = browser.visible();
    let empty_text = if browser.facts().is_pending() {
        "Loading..."
    } else if browser.facts().is_failed() {
        "Could not load memories"
    } else {
        "No memories found"
    };
    let list = FactListWidget::new(&visible, &app.theme)
        .offset(app.fact_offset)
        .title(browser.summary())
        .empty_text(empty_text);
    frame.render_widget(list, rows[2]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = StatusBarWidget::new(app.page(), app.input_mode, &app.theme)
        .backend_url(app.backend_url())
        .in_flight(app.router.in_flight())
        .message(app.status_message());
    frame.render_widget(status, area);
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 24, area);

    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Memory Workspace - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Pages:"),
        Line::from("  1-5 or h/l     Home, Dashboard, Chat, Import, Memory"),
        Line::from(""),
        section("Input Modes:"),
        Line::from("  i       Type into the page's field"),
        Line::from("  Esc     Return to NORMAL mode"),
        Line::from("  Enter   Submit"),
        Line::from(""),
        section("Page keys (NORMAL mode):"),
        Line::from("  a-d     Chat: use a suggested question"),
        Line::from("  t / s   Import: switch provider / start"),
        Line::from("  / Tab   Memory: search / cycle category"),
        Line::from("  r       Dashboard, Memory: refresh"),
        Line::from("  j/k     Scroll"),
        Line::from(""),
        Line::from("  q       Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::{MockBackend, Router, RouterConfig};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_landing_page_renders() {
        let app = App::new(Router::new(Arc::new(MockBackend::new()), RouterConfig::default()));
        let text = screen(&app);
        assert!(text.contains("Your AI Memory Center"));
        assert!(text.contains("Memory Bank"));
        assert!(text.contains("NORMAL"));
    }

    #[tokio::test]
    async fn test_dashboard_renders_loaded_stats() {
        let mock = MockBackend::new();
        let mut app = App::new(Router::new(Arc::new(mock), RouterConfig::default()));
        app.navigate(Page::Dashboard);
        app.router.settle().await;

        let text = screen(&app);
        assert!(text.contains("Total Memories"));
        assert!(text.contains("mock"));
        assert!(text.contains("online"));
    }

    #[tokio::test]
    async fn test_help_overlay_renders() {
        let mut app = App::new(Router::new(Arc::new(MockBackend::new()), RouterConfig::default()));
        app.toggle_help();
        assert!(screen(&app).contains("Memory Workspace - Help"));
    }
}
