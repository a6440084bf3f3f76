use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::{Message as ChatMessage, Role};
use crate::core::chat::SEND_ERROR_TEXT;
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top and bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

/// A single transcript entry. Created fresh each frame by the message list.
///
/// User turns are shown verbatim in green. Bot turns are Markdown, rendered
/// in blue; the synthetic send-failure reply is shown in red so it does not
/// read like an answer.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage) -> Self {
        Self { message }
    }

    fn is_error(&self) -> bool {
        self.message.role == Role::Bot && self.message.content == SEND_ERROR_TEXT
    }

    fn accent(&self) -> Color {
        match self.message.role {
            Role::User => Color::Green,
            Role::Bot if self.is_error() => Color::Red,
            Role::Bot => Color::Blue,
        }
    }

    fn body(&self) -> Text<'static> {
        let content = self.message.content.trim();
        match self.message.role {
            Role::Bot if !self.is_error() => markdown::render(content, self.accent()),
            _ => Text::styled(content.to_owned(), Style::default().fg(self.accent())),
        }
    }

    fn paragraph(&self) -> Paragraph<'static> {
        Paragraph::new(self.body()).wrap(Wrap { trim: false })
    }

    /// Rows this message needs at `width`, borders included.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if inner == 0 {
            return 1;
        }
        if message.content.trim().is_empty() {
            return VERTICAL_OVERHEAD + 1;
        }
        let rows = Message::new(message).paragraph().line_count(inner);
        u16::try_from(rows.max(1))
            .unwrap_or(u16::MAX)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    fn title(&self) -> Line<'static> {
        let who = match self.message.role {
            Role::User => "you",
            Role::Bot => "callisto",
        };
        let mut spans = vec![Span::raw(format!(" {who} "))];
        if let Some(time) = self.message.display_time() {
            spans.push(Span::styled(
                format!("{time} "),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for Message<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::DIM);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(self.title())
            .title_style(border)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        self.paragraph().render(inner, buf);
    }
}

impl Component for Message<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
