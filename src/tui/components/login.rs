//! # Login Component
//!
//! Full-screen sign-in / registration form shown while nobody is signed in.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `LoginFormState` (the two text fields and focus) lives in `TuiState`
//! - `LoginForm` is created each frame with borrowed state and the core
//!   `AuthForm` (mode, error, in-flight) as props

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use super::centered_box;
use super::text_field::{FieldEvent, TextField};
use crate::api::Credentials;
use crate::core::auth::{AuthForm, AuthMode};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const FORM_WIDTH: u16 = 52;
const FORM_HEIGHT: u16 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Submit,
    Toggle,
}

impl LoginFocus {
    fn next(self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Submit,
            LoginFocus::Submit => LoginFocus::Toggle,
            LoginFocus::Toggle => LoginFocus::Username,
        }
    }

    fn prev(self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Toggle,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Submit => LoginFocus::Password,
            LoginFocus::Toggle => LoginFocus::Submit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    Submit(Credentials),
    ToggleMode,
}

pub struct LoginFormState {
    pub username: TextField,
    pub password: TextField,
    pub focus: LoginFocus,
}

impl Default for LoginFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFormState {
    pub fn new() -> Self {
        Self {
            username: TextField::new(),
            password: TextField::masked(),
            focus: LoginFocus::Username,
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.value().to_string(),
            password: self.password.value().to_string(),
        }
    }
}

impl EventHandler for LoginFormState {
    type Event = LoginEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::FocusNext | TuiEvent::CursorDown => {
                self.focus = self.focus.next();
                None
            }
            TuiEvent::FocusPrev | TuiEvent::CursorUp => {
                self.focus = self.focus.prev();
                None
            }
            _ => match self.focus {
                LoginFocus::Username => match self.username.handle_event(event) {
                    Some(FieldEvent::Submit) => {
                        self.focus = LoginFocus::Password;
                        None
                    }
                    _ => None,
                },
                LoginFocus::Password => match self.password.handle_event(event) {
                    Some(FieldEvent::Submit) => Some(LoginEvent::Submit(self.credentials())),
                    _ => None,
                },
                LoginFocus::Submit => match event {
                    TuiEvent::Submit | TuiEvent::InputChar(' ') => {
                        Some(LoginEvent::Submit(self.credentials()))
                    }
                    _ => None,
                },
                LoginFocus::Toggle => match event {
                    TuiEvent::Submit | TuiEvent::InputChar(' ') => Some(LoginEvent::ToggleMode),
                    _ => None,
                },
            },
        }
    }
}

pub struct LoginForm<'a> {
    pub state: &'a mut LoginFormState,
    pub form: &'a AuthForm,
}

impl<'a> LoginForm<'a> {
    pub fn new(state: &'a mut LoginFormState, form: &'a AuthForm) -> Self {
        Self { state, form }
    }

    fn button(&self, label: &str, focused: bool, color: Color) -> Line<'static> {
        let style = if focused {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        Line::from(Span::styled(format!("[ {label} ]"), style)).centered()
    }
}

impl Component for LoginForm<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer = centered_box(FORM_WIDTH, FORM_HEIGHT, area);
        frame.render_widget(Clear, outer);

        let subtitle = match self.form.mode {
            AuthMode::SignIn => " Sign in ",
            AuthMode::Register => " Create an account ",
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Blue))
            .title(Line::styled(" Callisto ", Style::default().add_modifier(Modifier::BOLD)))
            .title_bottom(Line::from(subtitle).centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let [_, username_area, password_area, _, submit_area, error_area, toggle_area, _, hint_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(inner);

        let focus = self.state.focus;
        self.state
            .username
            .render(frame, username_area, " Username ", focus == LoginFocus::Username);
        self.state
            .password
            .render(frame, password_area, " Password ", focus == LoginFocus::Password);

        let label = if self.form.in_flight {
            "Please wait..."
        } else {
            self.form.mode.submit_label()
        };
        frame.render_widget(
            self.button(label, focus == LoginFocus::Submit, Color::Green),
            submit_area,
        );

        if let Some(error) = &self.form.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                error_area,
            );
        }

        frame.render_widget(
            self.button(self.form.mode.switch_prompt(), focus == LoginFocus::Toggle, Color::Cyan),
            toggle_area,
        );
        frame.render_widget(
            Line::from(Span::styled(
                "Tab next field · Enter submit · Ctrl+C quit",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
            hint_area,
        );
    }
}
