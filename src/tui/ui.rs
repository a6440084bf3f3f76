use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::api::DEFAULT_SESSION_TITLE;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{
    ChatView, ConfirmDelete, ImageViewer, LoginForm, Sidebar, TitleBar, Welcome,
};
use crate::tui::{Focus, TuiState};

const SIDEBAR_WIDTH: u16 = 32;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let [title_area, body_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(frame.area());

    if app.is_authenticated() {
        draw_main(frame, body_area, app, tui, spinner_frame);
    } else {
        LoginForm::new(&mut tui.login, &app.auth).render(frame, body_area);
    }

    let has_unseen_content = app.chat.is_some() && tui.message_list.has_unseen_content();
    TitleBar::new(
        app.user.as_ref().map(|u| u.username.clone()),
        app.status_message.clone(),
        has_unseen_content,
    )
    .render(frame, title_area);

    draw_overlays(frame, body_area, app, tui);
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)]).areas(area);

    Sidebar {
        state: &mut tui.sidebar,
        sessions: &app.sessions,
        current_session_id: app.current_session_id.as_deref(),
        user: app.user.as_ref(),
        focused: tui.focus == Focus::Sidebar,
    }
    .render(frame, sidebar_area);

    match &app.chat {
        Some(panel) => {
            let title = app
                .sessions
                .get(&panel.session_id)
                .map(|s| s.display_title())
                .unwrap_or(DEFAULT_SESSION_TITLE);
            ChatView {
                panel,
                title,
                message_list: &mut tui.message_list,
                input: &mut tui.input_box,
                spinner_frame,
                focused: tui.focus == Focus::Chat && tui.prompt.is_none(),
            }
            .render(frame, main_area);
        }
        None => {
            let username = app.user.as_ref().map(|u| u.username.as_str()).unwrap_or_default();
            Welcome { username }.render(frame, main_area);
        }
    }
}

fn draw_overlays(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    if let Some(panel) = &app.chat
        && let Some(index) = panel.viewing_image
        && let Some(image) = panel.current_image()
    {
        ImageViewer {
            image: &image,
            index,
            total: panel.images().len(),
        }
        .render(frame, area);
    }

    if let Some(prompt) = tui.prompt.as_mut() {
        prompt.render(frame, area);
    }

    if let Some(title) = app.pending_delete_title() {
        ConfirmDelete { title }.render(frame, area);
    }
}
