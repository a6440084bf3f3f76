//! # Welcome Component
//!
//! Shown in place of the chat panel while no session is open.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct Welcome<'a> {
    pub username: &'a str,
}

impl Welcome<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                format!("Welcome, {}", self.username),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Press Ctrl+N to start a new chat,",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "or pick one from the sidebar.",
                Style::default().fg(Color::Gray),
            )),
            Line::default(),
            Line::from(Span::styled(
                format!("Callisto v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            )),
        ]
    }
}

impl Component for Welcome<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let [centered] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
    }
}
