//! Form field component for user input
//!
//! A field only holds UI state (cursor position, whether a secret is revealed).
//! The text itself belongs to the form controller and is passed in by reference,
//! so nothing here can leak into validation or the outbound payload.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::admin_tui::ui::Styles;

const MASK: char = '•';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Masked unless revealed
    Secret,
    /// One of a fixed list of `(value, label)` options
    Choice(Vec<(&'static str, &'static str)>),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    pub placeholder: String,
    pub kind: FieldKind,
    /// Cursor position in characters
    pub cursor: usize,
    pub revealed: bool,
}

fn byte_index(value: &str, cursor: usize) -> usize {
    value
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

impl FormField {
    pub fn new(name: &'static str, label: &str) -> Self {
        Self {
            name,
            label: label.to_string(),
            placeholder: String::new(),
            kind: FieldKind::Text,
            cursor: 0,
            revealed: false,
        }
    }

    pub fn secret(mut self) -> Self {
        self.kind = FieldKind::Secret;
        self
    }

    pub fn choice(mut self, options: Vec<(&'static str, &'static str)>) -> Self {
        self.kind = FieldKind::Choice(options);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    pub fn is_secret(&self) -> bool {
        self.kind == FieldKind::Secret
    }

    pub fn insert_char(&mut self, value: &mut String, c: char) {
        if self.is_choice() {
            return;
        }
        self.clamp_cursor(value);
        value.insert(byte_index(value, self.cursor), c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self, value: &mut String) {
        self.clamp_cursor(value);
        if self.cursor > 0 && !self.is_choice() {
            self.cursor -= 1;
            value.remove(byte_index(value, self.cursor));
        }
    }

    pub fn delete_char_forward(&mut self, value: &mut String) {
        self.clamp_cursor(value);
        if self.cursor < value.chars().count() && !self.is_choice() {
            value.remove(byte_index(value, self.cursor));
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self, value: &str) {
        if self.cursor < value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_to_end(&mut self, value: &str) {
        self.cursor = value.chars().count();
    }

    fn clamp_cursor(&mut self, value: &str) {
        self.cursor = self.cursor.min(value.chars().count());
    }

    /// Next (or previous) option after `value`; `None` for non-choice fields
    pub fn cycle(&self, value: &str, forward: bool) -> Option<String> {
        let FieldKind::Choice(options) = &self.kind else {
            return None;
        };
        if options.is_empty() {
            return None;
        }

        let len = options.len();
        let next = match options.iter().position(|(v, _)| *v == value) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        Some(options[next].0.to_string())
    }

    pub fn toggle_reveal(&mut self) {
        if self.is_secret() {
            self.revealed = !self.revealed;
        }
    }

    /// Text shown in the input box for `value`
    pub fn display_value(&self, value: &str) -> String {
        match &self.kind {
            FieldKind::Secret if !self.revealed => MASK.to_string().repeat(value.chars().count()),
            FieldKind::Choice(options) => {
                let label = options
                    .iter()
                    .find(|(v, _)| *v == value)
                    .map(|(_, label)| *label)
                    .unwrap_or(value);
                format!("< {} >", label)
            }
            _ => value.to_string(),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, value: &str, focused: bool, error: Option<&str>) {
        let show_placeholder = value.is_empty() && !self.placeholder.is_empty();
        let display_text = if show_placeholder {
            self.placeholder.clone()
        } else {
            self.display_value(value)
        };

        let border_style = if focused {
            Styles::active_border()
        } else if error.is_some() {
            Styles::error()
        } else {
            Styles::inactive_border()
        };

        let mut title = self.label.clone();
        if self.is_secret() && focused {
            title.push_str(if self.revealed { " (F2 to hide)" } else { " (F2 to show)" });
        }
        if let Some(error) = error {
            title = format!("{} - {}", title, error);
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text_style = if show_placeholder {
            Styles::inactive()
        } else {
            Style::default()
        };

        f.render_widget(Paragraph::new(display_text).style(text_style).block(block), area);

        if focused && !self.is_choice() {
            let cursor_x = area.x + 1 + self.cursor.min(value.chars().count()) as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_at_cursor_with_multibyte_text() {
        let mut field = FormField::new("title", "Title");
        let mut value = String::new();
        for c in "Bli".chars() {
            field.insert_char(&mut value, c);
        }
        field.move_cursor_left();
        field.move_cursor_left();
        field.insert_char(&mut value, 'ä');
        assert_eq!(value, "Bäli");
        assert_eq!(field.cursor, 2);

        field.delete_char(&mut value);
        assert_eq!(value, "Bli");
        field.delete_char_forward(&mut value);
        assert_eq!(value, "Bi");
        field.move_cursor_to_end(&value);
        field.move_cursor_right(&value);
        assert_eq!(field.cursor, 2);
    }

    #[test]
    fn test_cursor_is_clamped_to_replaced_value() {
        let mut field = FormField::new("title", "Title");
        field.cursor = 10;
        let mut value = "ab".to_string();
        field.insert_char(&mut value, 'c');
        assert_eq!(value, "abc");
        assert_eq!(field.cursor, 3);
    }

    #[test]
    fn test_secret_masking() {
        let mut field = FormField::new("password", "Password").secret();
        assert_eq!(field.display_value("hunter22"), "••••••••");
        field.toggle_reveal();
        assert_eq!(field.display_value("hunter22"), "hunter22");
    }

    #[test]
    fn test_choice_cycles_and_ignores_typing() {
        let field = FormField::new("type", "Type").choice(vec![("inter_city", "Inter City"), ("tourism", "Tourism")]);
        assert_eq!(field.cycle("tourism", true).as_deref(), Some("inter_city"));
        assert_eq!(field.cycle("inter_city", false).as_deref(), Some("tourism"));
        assert_eq!(field.cycle("", true).as_deref(), Some("inter_city"));
        assert_eq!(field.display_value("tourism"), "< Tourism >");

        let mut field = field;
        let mut value = "tourism".to_string();
        field.insert_char(&mut value, 'x');
        assert_eq!(value, "tourism");
        assert_eq!(FormField::new("title", "Title").cycle("x", true), None);
    }
}
