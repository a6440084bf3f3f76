//! Modal dialogs drawn over the main screen: delete confirmation and the
//! attachment path prompt.

use std::path::PathBuf;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use super::centered_box;
use super::text_field::{FieldEvent, TextField};
use crate::core::attachments::{AttachmentKind, parse_selection};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
    Confirm,
    Cancel,
}

/// Maps a key in the confirmation dialog to an answer.
pub fn confirm_answer(event: &TuiEvent) -> Option<ConfirmEvent> {
    match event {
        TuiEvent::InputChar('y' | 'Y') | TuiEvent::Submit => Some(ConfirmEvent::Confirm),
        TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => Some(ConfirmEvent::Cancel),
        _ => None,
    }
}

/// "Delete chat?" dialog. Stateless; the pending session lives in `App`.
pub struct ConfirmDelete<'a> {
    pub title: &'a str,
}

impl Component for ConfirmDelete<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer = centered_box(50, 7, area);
        frame.render_widget(Clear, outer);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(" Delete chat ")
            .padding(Padding::horizontal(1));
        let body = vec![
            Line::from(vec![
                Span::raw("Delete "),
                Span::styled(
                    format!("\"{}\"", self.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("?"),
            ]),
            Line::from(Span::styled(
                "This cannot be undone.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw(" delete   "),
                Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" / Esc cancel"),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
            outer,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Attach(AttachmentKind, Vec<PathBuf>),
    Cancel,
}

/// Asks for the local path(s) of a file to attach.
pub struct PathPrompt {
    pub kind: AttachmentKind,
    pub field: TextField,
    pub error: Option<String>,
}

impl PathPrompt {
    pub fn new(kind: AttachmentKind) -> Self {
        Self {
            kind,
            field: TextField::new(),
            error: None,
        }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            AttachmentKind::Image => " Attach image ",
            AttachmentKind::Document => " Attach documents ",
        }
    }

    fn help(&self) -> &'static str {
        match self.kind {
            AttachmentKind::Image => "Path to a png, jpg, jpeg, gif, webp or bmp file.",
            AttachmentKind::Document => "Paths to pdf, docx, pptx or txt files, separated by ';'.",
        }
    }
}

impl EventHandler for PathPrompt {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if matches!(event, TuiEvent::Escape) {
            return Some(PromptEvent::Cancel);
        }
        match self.field.handle_event(event)? {
            FieldEvent::Changed => {
                self.error = None;
                None
            }
            FieldEvent::Submit => match parse_selection(self.field.value(), self.kind) {
                Ok(paths) => Some(PromptEvent::Attach(self.kind, paths)),
                Err(e) => {
                    self.error = Some(e.to_string());
                    None
                }
            },
        }
    }
}

impl Component for PathPrompt {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer = centered_box(64, 9, area);
        frame.render_widget(Clear, outer);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(self.title())
            .title_bottom(Line::from(" Enter attach · Esc cancel ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let [help_area, field_area, error_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(inner);

        frame.render_widget(
            Line::from(Span::styled(self.help(), Style::default().fg(Color::DarkGray))),
            help_area,
        );
        self.field.render(frame, field_area, " Path ", true);
        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
                    .wrap(Wrap { trim: true }),
                error_area,
            );
        }
    }
}
