//! Single-line text input with a character cursor and recall history.

use std::collections::VecDeque;

const HISTORY_LIMIT: usize = 100;

/// Editable text field used by the chat box, search box and path prompt.
///
/// The cursor counts characters, not bytes, so editing stays valid for any
/// unicode input.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
    history: VecDeque<String>,
    history_index: Option<usize>,
    draft: Option<String>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace the content and move the cursor to the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the content, recording it in history. None when empty.
    pub fn submit(&mut self) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history.push_front(text.clone());
        self.history.truncate(HISTORY_LIMIT);
        self.history_index = None;
        self.draft = None;

        Some(text)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.remove_at_cursor();
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Step back to an older submission.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if self.history_index.is_none() && !self.text.is_empty() {
            self.draft = Some(self.text.clone());
        }

        let index = match self.history_index {
            None => 0,
            Some(i) => (i + 1).min(self.history.len() - 1),
        };
        if let Some(entry) = self.history.get(index).cloned() {
            self.set(entry);
            self.history_index = Some(index);
        }
    }

    /// Step forward toward the text being typed before browsing history.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                let draft = self.draft.take().unwrap_or_default();
                self.set(draft);
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.history.get(i - 1).cloned() {
                    self.set(entry);
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn remove_at_cursor(&mut self) {
        if let Some((at, ch)) = self.text.char_indices().nth(self.cursor) {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputBuffer {
        let mut input = InputBuffer::new();
        for c in s.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn test_unicode_editing() {
        let mut input = typed("héllo");
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text(), "hélo");
        assert_eq!(input.cursor(), 2);

        input.home();
        input.delete();
        assert_eq!(input.text(), "élo");

        input.end();
        input.insert('!');
        assert_eq!(input.text(), "élo!");
    }

    #[test]
    fn test_submit_clears_and_records() {
        let mut input = typed("first");
        assert_eq!(input.submit().as_deref(), Some("first"));
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.submit(), None);
    }

    #[test]
    fn test_history_round_trip_restores_draft() {
        let mut input = InputBuffer::new();
        input.set("one");
        input.submit();
        input.set("two");
        input.submit();
        input.set("draft");

        input.history_prev();
        assert_eq!(input.text(), "two");
        input.history_prev();
        assert_eq!(input.text(), "one");
        input.history_prev();
        assert_eq!(input.text(), "one");

        input.history_next();
        assert_eq!(input.text(), "two");
        input.history_next();
        assert_eq!(input.text(), "draft");
    }

    #[test]
    fn test_blank_detection() {
        assert!(typed("   ").is_blank());
        assert!(!typed(" a ").is_blank());
    }
}
