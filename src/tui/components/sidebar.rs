//! # Sidebar Component
//!
//! Session list with search, shown on the left of the main screen.
//!
//! - `/` or Ctrl+F focuses the search field; typing filters by title
//! - Up/Down move the highlight, Enter opens the highlighted chat
//! - `d` or Delete asks to delete it (confirmed in a dialog)
//! - `n` starts a new chat
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with the session list as props

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use super::text_field::{FieldEvent, TextField};
use crate::api::User;
use crate::core::sessions::SessionList;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Select(String),
    RequestDelete(String),
    NewChat,
}

#[derive(Default)]
pub struct SidebarState {
    pub search: TextField,
    pub search_focused: bool,
    /// Index into the filtered list
    pub selected: usize,
    pub list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> &str {
        self.search.value()
    }

    pub fn focus_search(&mut self) {
        self.search_focused = true;
    }

    fn selected_id(&self, sessions: &SessionList) -> Option<String> {
        sessions
            .filtered(self.term())
            .get(self.selected)
            .map(|s| s.id.clone())
    }

    fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Routes an event while the sidebar has focus.
    pub fn handle_event(&mut self, event: &TuiEvent, sessions: &SessionList) -> Option<SidebarEvent> {
        if self.search_focused {
            match event {
                TuiEvent::Escape | TuiEvent::Submit | TuiEvent::CursorDown => {
                    self.search_focused = false;
                }
                _ => {
                    if self.search.handle_event(event) == Some(FieldEvent::Changed) {
                        self.selected = 0;
                    }
                }
            }
            return None;
        }

        let visible = sessions.filtered(self.term()).len();
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected += 1;
                self.clamp(visible);
                None
            }
            TuiEvent::Submit => self.selected_id(sessions).map(SidebarEvent::Select),
            TuiEvent::InputChar('d') | TuiEvent::Delete => {
                self.selected_id(sessions).map(SidebarEvent::RequestDelete)
            }
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('/') => {
                self.search_focused = true;
                None
            }
            TuiEvent::Escape => {
                self.search.clear();
                self.selected = 0;
                None
            }
            _ => None,
        }
    }
}

pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub sessions: &'a SessionList,
    pub current_session_id: Option<&'a str>,
    pub user: Option<&'a User>,
    pub focused: bool,
}

impl Sidebar<'_> {
    fn footer(&self) -> Line<'static> {
        let Some(user) = self.user else {
            return Line::default();
        };
        Line::from(vec![
            Span::styled(
                format!(" {} ", user.initial()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}", user.username)),
        ])
    }
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(border)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [new_chat_area, search_area, list_area, footer_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Line::from(Span::styled(
                "+ New chat  (Ctrl+N)",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            new_chat_area,
        );
        self.state
            .search
            .render(frame, search_area, " Search ", self.state.search_focused);

        let filtered = self.sessions.filtered(self.state.term());
        self.state.clamp(filtered.len());

        if filtered.is_empty() {
            let text = if self.sessions.is_empty() {
                "No chats yet"
            } else {
                "No matching chats"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
                list_area,
            );
            self.state.list_state.select(None);
        } else {
            let items: Vec<ListItem> = filtered
                .iter()
                .map(|session| {
                    let is_current = self.current_session_id == Some(session.id.as_str());
                    let (marker, style) = if is_current {
                        ("● ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    } else {
                        ("  ", Style::default().fg(Color::Gray))
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, style),
                        Span::styled(session.display_title().to_string(), style),
                    ]))
                })
                .collect();
            let highlight = if self.focused && !self.state.search_focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            self.state.list_state.select(Some(self.state.selected));
            frame.render_stateful_widget(
                List::new(items).highlight_style(highlight),
                list_area,
                &mut self.state.list_state,
            );
        }

        frame.render_widget(self.footer(), footer_area);
        let hint = if self.focused {
            "Enter open · d delete · / search"
        } else {
            "Ctrl+L sign out"
        };
        frame.render_widget(
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            hint_area,
        );
    }
}
