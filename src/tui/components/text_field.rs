//! Single-line text field used by the login form, the sidebar search and
//! the attachment prompt. Optionally masks its content (passwords).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::editing::{next_boundary, prev_boundary};
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    Changed,
    Submit,
}

#[derive(Debug, Default, Clone)]
pub struct TextField {
    value: String,
    cursor: usize,
    masked: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Text as it should appear on screen.
    fn shown(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Renders the field inside `block`. The terminal cursor is placed only
    /// when the field has focus.
    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, focused: bool) {
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(title.to_string());
        let inner = block.inner(area);

        // Keep the cursor in view by scrolling horizontally
        let shown = self.shown();
        let before = if self.masked {
            "•".repeat(self.value[..self.cursor].chars().count())
        } else {
            self.value[..self.cursor].to_string()
        };
        let cursor_col = u16::try_from(before.width()).unwrap_or(u16::MAX);
        let scroll = cursor_col.saturating_sub(inner.width.saturating_sub(1));

        frame.render_widget(
            Paragraph::new(shown).block(block).scroll((0, scroll)),
            area,
        );
        if focused && inner.width > 0 {
            frame.set_cursor_position((inner.x + cursor_col - scroll, inner.y));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                let line: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                self.value.insert_str(self.cursor, &line);
                self.cursor += line.len();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_boundary(&self.value, self.cursor);
                self.value.drain(prev..self.cursor);
                self.cursor = prev;
                Some(FieldEvent::Changed)
            }
            TuiEvent::Delete if self.cursor < self.value.len() => {
                let next = next_boundary(&self.value, self.cursor);
                self.value.drain(self.cursor..next);
                Some(FieldEvent::Changed)
            }
            TuiEvent::CursorLeft => {
                self.cursor = prev_boundary(&self.value, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = next_boundary(&self.value, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.value.len();
                None
            }
            TuiEvent::Submit => Some(FieldEvent::Submit),
            _ => None,
        }
    }
}
