//! # ChatPanel Component
//!
//! The right-hand side of the main screen for an open session:
//!
//! ```text
//! ┌ header: session title + shortcuts ─────────────┐
//! │ MessageList                                    │
//! │ attachment bar (only when something is picked) │
//! │ InputBox                                       │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Transient wrapper: the core `ChatPanel` is props, the message list and
//! input box states are borrowed from `TuiState`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::input_box::InputBox;
use super::message_list::{MessageList, MessageListState};
use crate::core::attachments::{AttachmentKind, display_name};
use crate::core::chat::ChatPanel;
use crate::tui::component::Component;

const SHORTCUTS: &str = "Ctrl+G /image · Ctrl+O image · Ctrl+D docs · Ctrl+P preview";

pub struct ChatView<'a> {
    pub panel: &'a ChatPanel,
    pub title: &'a str,
    pub message_list: &'a mut MessageListState,
    pub input: &'a mut InputBox,
    pub spinner_frame: usize,
    pub focused: bool,
}

/// One-line summary of the pending attachments, if any.
pub fn attachment_summary(panel: &ChatPanel) -> Option<Line<'static>> {
    if !panel.has_attachments() {
        return None;
    }
    let label = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::raw("📎 ")];
    if let Some(image) = &panel.selected_image {
        spans.push(Span::styled(format!("{}: ", AttachmentKind::Image.label()), label));
        spans.push(Span::raw(display_name(image)));
    }
    if !panel.selected_documents.is_empty() {
        if panel.selected_image.is_some() {
            spans.push(Span::raw("  "));
        }
        let names: Vec<String> = panel
            .selected_documents
            .iter()
            .map(|p| display_name(p))
            .collect();
        spans.push(Span::styled(format!("{}: ", AttachmentKind::Document.label()), label));
        spans.push(Span::raw(names.join(", ")));
    }
    Some(Line::from(spans))
}

impl Component for ChatView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.input.image_mode = self.panel.image_mode;
        self.input.busy = self.panel.is_loading;
        self.input.focused = self.focused;

        let attachments = attachment_summary(self.panel);
        let attachment_height = u16::from(attachments.is_some());
        let input_height = self.input.calculate_height(area.width);

        let [header_area, list_area, attachment_area, input_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(attachment_height),
            Constraint::Length(input_height),
        ])
        .areas(area);

        let header = Line::from(vec![
            Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {SHORTCUTS}"), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(header, header_area);

        MessageList::new(
            self.message_list,
            &self.panel.messages,
            self.panel.is_loading,
            self.panel.history_loaded,
            self.spinner_frame,
        )
        .render(frame, list_area);

        if let Some(line) = attachments {
            frame.render_widget(line, attachment_area);
        }

        self.input.render(frame, input_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Message, Role};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn draw(panel: &ChatPanel) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        let mut list = MessageListState::new();
        let mut input = InputBox::new();
        terminal
            .draw(|f| {
                ChatView {
                    panel,
                    title: "Rust tips",
                    message_list: &mut list,
                    input: &mut input,
                    spinner_frame: 0,
                    focused: true,
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_attachment_summary() {
        let mut panel = ChatPanel::new("s-1".to_string(), 1);
        assert!(attachment_summary(&panel).is_none());

        panel.attach_image(PathBuf::from("/tmp/cat.png"));
        panel.attach_documents(vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("b.txt")]);
        let line = attachment_summary(&panel).unwrap().to_string();
        assert!(line.contains("Image: cat.png"));
        assert!(line.contains("Doc: a.pdf, b.txt"));
    }

    #[test]
    fn test_render_history_and_input() {
        let mut panel = ChatPanel::new("s-1".to_string(), 1);
        panel.load_history(vec![
            Message::local(Role::User, "how do I borrow?".to_string()),
            Message::local(Role::Bot, "With `&`.".to_string()),
        ]);
        let text = draw(&panel);
        assert!(text.contains("Rust tips"));
        assert!(text.contains("how do I borrow?"));
        assert!(text.contains("With &."));
        assert!(text.contains("Type a message"));
    }

    #[test]
    fn test_render_pending_send() {
        let mut panel = ChatPanel::new("s-1".to_string(), 1);
        panel.load_history(Vec::new());
        panel.toggle_image_mode();
        panel.begin_send("a lighthouse");
        let text = draw(&panel);
        assert!(text.contains("/image a lighthouse"));
        assert!(text.contains("Thinking..."));
        assert!(text.contains("Waiting for a reply"));
    }
}
