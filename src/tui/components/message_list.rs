//! # MessageList Component
//!
//! Scrollable transcript of the open chat.
//!
//! ## Responsibilities
//!
//! - Lay out messages in a `ScrollView` with a cached height per message
//! - Stick to the bottom while new turns arrive, unless the user scrolled up
//! - Show a "Thinking..." row while a reply is pending
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the messages (props).

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::Message as ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Rows reserved under the last message for the thinking indicator.
const THINKING_ROWS: u16 = 2;

/// Scroll position and layout cache. Persisted in `TuiState`, reset
/// whenever a new chat panel is mounted.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub stick_to_bottom: bool,
    pub viewport_height: u16,
    heights: Vec<u16>,
    cached_width: u16,
    /// Id of the last message measured; a reload with different ids invalidates the cache
    cached_last_id: Option<String>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            heights: Vec::new(),
            cached_width: 0,
            cached_last_id: None,
        }
    }

    fn total_height(&self) -> u16 {
        self.heights.iter().fold(0u16, |acc, h| acc.saturating_add(*h))
    }

    /// Brings the height cache in line with `messages`. Messages are only
    /// ever appended, so earlier heights stay valid until the width changes
    /// or the history is replaced.
    fn measure(&mut self, messages: &[ChatMessage], width: u16) {
        let prefix_intact = self.heights.len() <= messages.len()
            && match (&self.cached_last_id, self.heights.len().checked_sub(1)) {
                (Some(id), Some(idx)) => messages[idx].id == *id,
                (None, None) => true,
                _ => false,
            };
        if width != self.cached_width || !prefix_intact {
            self.heights.clear();
            self.cached_width = width;
        }
        for m in messages.iter().skip(self.heights.len()) {
            self.heights.push(Message::calculate_height(m, width));
        }
        self.cached_last_id = messages.last().map(|m| m.id.clone());
    }

    fn max_offset(&self, extra: u16) -> u16 {
        self.total_height()
            .saturating_add(extra)
            .saturating_sub(self.viewport_height)
    }

    /// True when more content sits below the visible window.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset(0)
    }

    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset(0);
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    pub is_loading: bool,
    pub history_loaded: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [ChatMessage],
        is_loading: bool,
        history_loaded: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            history_loaded,
            spinner_frame,
        }
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let text = if self.history_loaded {
            "No messages yet. Say hello!"
        } else {
            "Loading conversation..."
        };
        let y = area.y + area.height / 2;
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
            Rect::new(area.x, y, area.width, 1.min(area.height)),
        );
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.messages.is_empty() && !self.is_loading {
            self.render_placeholder(frame, area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar column
        self.state.viewport_height = area.height;
        self.state.measure(self.messages, content_width);

        let extra = if self.is_loading { THINKING_ROWS } else { 0 };
        let canvas_height = self.state.total_height().saturating_add(extra);

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (message, &height) in self.messages.iter().zip(self.state.heights.iter()) {
            scroll_view.render_widget(Message::new(message), Rect::new(0, y, content_width, height));
            y = y.saturating_add(height);
        }

        if self.is_loading {
            let spinner = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            let thinking = Line::from(vec![
                Span::styled(format!(" {spinner} "), Style::default().fg(Color::Blue)),
                Span::styled(
                    "Thinking...",
                    Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
                ),
            ]);
            scroll_view.render_widget(
                Paragraph::new(thinking),
                Rect::new(0, y.saturating_add(1), content_width, 1),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else {
            let max_y = self.state.max_offset(extra);
            if self.state.scroll_state.offset().y > max_y {
                self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
            }
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
