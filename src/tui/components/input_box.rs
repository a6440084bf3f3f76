//! # InputBox Component
//!
//! Multi-line message composer at the bottom of the chat panel.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Ctrl+J for newlines)
//! - Cursor movement across wrapped lines
//! - Emit `Submit` on Enter without clearing; the parent clears the box
//!   only once a send has actually started
//! - Show whether image generation mode is on, and dim while a reply is pending
//!
//! The buffer is internal state. `image_mode`, `busy` and `focused` are
//! props synced from the app state before each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use super::editing::{
    cursor_cell, line_end, line_start, next_boundary, prev_boundary, wrap_options, wrapped_rows,
};
use crate::core::chat::IMAGE_COMMAND;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the box scrolls internally
const MAX_VISIBLE_ROWS: u16 = 5;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Byte offset of the cursor
    cursor: usize,
    /// First visible wrapped row
    scroll: u16,
    /// Width of the last render, for vertical cursor movement
    last_width: u16,
    pub image_mode: bool,
    pub busy: bool,
    pub focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            last_width: 80,
            image_mode: false,
            busy: false,
            focused: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn inner_width(width: u16) -> u16 {
        width.saturating_sub(HORIZONTAL_OVERHEAD)
    }

    /// Height needed for the current content, clamped to the visible row limit.
    pub fn calculate_height(&self, width: u16) -> u16 {
        wrapped_rows(&self.buffer, Self::inner_width(width)).min(MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(" Message ")];
        if self.image_mode {
            spans.push(Span::styled(
                format!(" {IMAGE_COMMAND} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    /// Moves the cursor one wrapped row up or down, keeping the column where possible.
    fn move_row(&mut self, down: bool) -> bool {
        let width = Self::inner_width(self.last_width);
        if width == 0 || self.buffer.is_empty() {
            return false;
        }
        let rows = textwrap::wrap(&self.buffer, wrap_options(width));
        let (row, col) = cursor_cell(&self.buffer, self.cursor, width);
        let target = if down {
            row + 1
        } else {
            match row.checked_sub(1) {
                Some(r) => r,
                None => return false,
            }
        };
        if usize::from(target) >= rows.len() {
            return false;
        }

        // Walk the buffer to the start of the target row
        let mut offset = 0;
        for r in rows.iter().take(usize::from(target)) {
            let bytes = self.buffer.as_bytes();
            offset += r.len();
            while offset < bytes.len() && bytes[offset] == b' ' {
                offset += 1;
            }
            if offset < bytes.len() && bytes[offset] == b'\n' {
                offset += 1;
            }
        }
        let row_text = &rows[usize::from(target)];
        let mut pos = offset;
        for _ in 0..usize::from(col).min(row_text.chars().count()) {
            pos = next_boundary(&self.buffer, pos);
        }
        self.cursor = pos.min(self.buffer.len());
        true
    }

    fn keep_cursor_visible(&mut self, width: u16) {
        let total = wrapped_rows(&self.buffer, width);
        if total <= MAX_VISIBLE_ROWS {
            self.scroll = 0;
            return;
        }
        let (row, _) = cursor_cell(&self.buffer, self.cursor, width);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + MAX_VISIBLE_ROWS {
            self.scroll = row + 1 - MAX_VISIBLE_ROWS;
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let width = Self::inner_width(area.width);
        self.keep_cursor_visible(width);

        let border_style = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title())
            .padding(ratatui::widgets::Padding::horizontal(1));

        let body = if self.buffer.is_empty() {
            let hint = if self.busy {
                "Waiting for a reply..."
            } else {
                "Type a message, Enter to send"
            };
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        } else {
            let rows: Vec<Line> = textwrap::wrap(&self.buffer, wrap_options(width))
                .into_iter()
                .skip(usize::from(self.scroll))
                .take(usize::from(MAX_VISIBLE_ROWS))
                .map(|r| Line::raw(r.into_owned()))
                .collect();
            Paragraph::new(rows)
        };
        frame.render_widget(body.block(block), area);

        let total = wrapped_rows(&self.buffer, width);
        if total > MAX_VISIBLE_ROWS {
            let mut state = ScrollbarState::default()
                .content_length(usize::from(total - MAX_VISIBLE_ROWS))
                .position(usize::from(self.scroll));
            let bar = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y + 1,
                width: 1,
                height: area.height.saturating_sub(2),
            };
            frame.render_stateful_widget(Scrollbar::new(ScrollbarOrientation::VerticalRight), bar, &mut state);
        }

        if self.focused && width > 0 {
            let (row, col) = cursor_cell(&self.buffer, self.cursor, width);
            let x = area.x + 2 + col.min(width);
            let y = area.y + 1 + row.saturating_sub(self.scroll);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let text = text.replace("\r\n", "\n");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = prev_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = next_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = line_start(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = line_end(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorUp => {
                self.move_row(false);
                None
            }
            TuiEvent::CursorDown => {
                self.move_row(true);
                None
            }
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}
