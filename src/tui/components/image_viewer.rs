//! Fullscreen preview of images embedded in bot replies.
//!
//! A terminal cannot show the picture itself, so the overlay shows what is
//! known about it (alt text and source) and offers to save it to disk.
//! ←/→ step through every image in the chat, `s` saves, Esc closes.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::core::chat::EmbeddedImage;
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    Step(isize),
    Download,
    Close,
}

pub fn viewer_event(event: &TuiEvent) -> Option<ViewerEvent> {
    match event {
        TuiEvent::CursorLeft | TuiEvent::CursorUp => Some(ViewerEvent::Step(-1)),
        TuiEvent::CursorRight | TuiEvent::CursorDown => Some(ViewerEvent::Step(1)),
        TuiEvent::InputChar('s' | 'S') => Some(ViewerEvent::Download),
        TuiEvent::Escape | TuiEvent::InputChar('q') => Some(ViewerEvent::Close),
        _ => None,
    }
}

pub struct ImageViewer<'a> {
    pub image: &'a EmbeddedImage,
    /// Zero-based position of `image` among `total`
    pub index: usize,
    pub total: usize,
}

impl Component for ImageViewer<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer = Rect {
            x: area.x + 2,
            y: area.y + 1,
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(2),
        };
        frame.render_widget(Clear, outer);

        let block = Block::bordered()
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" Image {}/{} ", self.index + 1, self.total))
            .title_bottom(Line::from(" ←/→ browse · s save · Esc close ").centered())
            .padding(Padding::uniform(1));

        let alt = if self.image.alt.is_empty() {
            "Generated image"
        } else {
            self.image.alt.as_str()
        };
        let body = vec![
            Line::default(),
            Line::from("🖼").alignment(Alignment::Center),
            Line::default(),
            Line::from(Span::styled(
                alt.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::default(),
            Line::from(Span::styled(
                self.image.url.clone(),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        ];
        frame.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
            outer,
        );
    }
}
