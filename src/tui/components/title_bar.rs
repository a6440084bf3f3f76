//! # TitleBar Component
//!
//! Top status bar: who is signed in, the last status message, and a
//! "↓ New" hint when the transcript has content below the scroll position.
//!
//! Purely presentational. All three fields are props:
//! - `username`: core `App` state
//! - `status_message`: core `App` state
//! - `has_unseen_content`: TUI scroll state
//!
//! Formatting priority keeps the most important part visible on narrow
//! terminals:
//!
//! 1. `"Callisto | ada | Signed in as ada | ↓ New"`
//! 2. `"Callisto | ada | Signed in as ada"`
//! 3. `"Callisto | ada"` or just `"Callisto"` before sign-in

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub username: Option<String>,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(username: Option<String>, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            username,
            status_message,
            has_unseen_content,
        }
    }

    fn segments(&self) -> Vec<String> {
        let mut parts = vec!["Callisto".to_string()];
        if let Some(name) = &self.username {
            parts.push(name.clone());
        }
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        if self.has_unseen_content {
            parts.push("↓ New".to_string());
        }
        parts
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, part) in self.segments().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
            }
            if i == 0 {
                spans.push(Span::styled(part, Style::default().add_modifier(Modifier::BOLD)));
            } else {
                spans.push(Span::raw(part));
            }
        }
        frame.render_widget(Line::from(spans), area);
    }
}
