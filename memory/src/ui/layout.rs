//! Screen layout

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas shared by every page.
pub struct AppLayout {
    pub tab_bar: Rect,
    pub body: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            tab_bar: chunks[0],
            body: chunks[1],
            status_bar: chunks[2],
            hotkey_bar: chunks[3],
        }
    }
}

/// Split `area` into a main region above a three-line input box.
pub fn with_input_box(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);
    (chunks[0], chunks[1])
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_small_areas() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect_fixed(50, 40, area), area);
    }

    #[test]
    fn test_app_layout_heights() {
        let layout = AppLayout::calculate(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.tab_bar.height, 1);
        assert_eq!(layout.status_bar.height, 3);
        assert_eq!(layout.hotkey_bar.height, 1);
        assert_eq!(layout.body.height, 19);
    }
}
