use crossterm::event::{KeyCode, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Maximum characters accepted by a prompt line
pub const CHAR_LIMIT: usize = 512;

/// Single-line editable buffer with a byte-indexed cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut input = Self::new();
        input.set_text(text);
        input
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the content (truncated to [`CHAR_LIMIT`]) and move the cursor to the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into().chars().take(CHAR_LIMIT).collect();
        self.cursor = self.text.len();
    }

    pub fn insert(&mut self, ch: char) {
        if self.text.chars().count() >= CHAR_LIMIT {
            return;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    /// Delete the word before the cursor, along with any spaces trailing it
    pub fn delete_word(&mut self) {
        let before = &self.text[..self.cursor];
        let trimmed = before.trim_end_matches(' ');
        let start = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Terminal columns occupied by the text before the cursor
    pub fn cursor_width(&self) -> usize {
        self.text[..self.cursor].width()
    }

    /// Apply an editing key. Returns false when the key is not an editing key.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Char('a') if ctrl => self.move_home(),
            KeyCode::Char('e') if ctrl => self.move_end(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => self.delete_word(),
            KeyCode::Char(_) if ctrl || modifiers.contains(KeyModifiers::ALT) => return false,
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().last().map(|(i, _)| i)
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self::with_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing() {
        let mut input = TextInput::new();
        for c in "abc".chars() {
            input.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(input.text(), "abc");

        input.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        input.handle_key(KeyCode::Char('x'), KeyModifiers::SHIFT);
        assert_eq!(input.text(), "axb");
        assert_eq!(input.cursor(), 2);

        input.handle_key(KeyCode::Home, KeyModifiers::NONE);
        input.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.text(), "xb");
    }

    #[test]
    fn test_ctrl_keys() {
        let mut input = TextInput::with_text("make dev  ");
        assert!(input.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "make ");

        assert!(input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(input.is_empty());

        assert!(!input.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!input.handle_key(KeyCode::Tab, KeyModifiers::NONE));
    }

    #[test]
    fn test_unicode_cursor() {
        let mut input = TextInput::with_text("你好");
        assert_eq!(input.cursor(), 6);
        assert_eq!(input.cursor_width(), 4);

        input.move_left();
        assert_eq!(input.cursor(), 3);
        input.insert('世');
        assert_eq!(input.text(), "你世好");
        input.move_right();
        assert_eq!(input.cursor(), input.text().len());
    }

    #[test]
    fn test_char_limit() {
        let mut input = TextInput::with_text("a".repeat(CHAR_LIMIT + 10));
        assert_eq!(input.text().chars().count(), CHAR_LIMIT);
        input.insert('b');
        assert_eq!(input.text().chars().count(), CHAR_LIMIT);
    }
}
