//! Sign-in / sign-up form rendering

use super::field_renderer::{draw_form_field, draw_help_text, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::AUTH_MODE_SHORTCUT;
use crate::state::{AuthMode, Form};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

const FORM_WIDTH: u16 = 60;

/// Draw the centered auth form
pub fn draw_auth(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.state.auth_form;
    let (title, switch_hint) = match form.mode {
        AuthMode::SignIn => (" Sign In ", "No account yet?"),
        AuthMode::SignUp => (" Create Account ", "Already registered?"),
    };

    let count = form.field_count() as u16;
    let height = count * FIELD_HEIGHT + 4;
    let width = FORM_WIDTH.min(area.width);
    let form_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height: height.min(area.height),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, form_area);

    let mut constraints: Vec<Constraint> = (0..count)
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(form_area);

    for index in 0..form.field_count() {
        if let Some(field) = form.get_field(index) {
            draw_form_field(frame, chunks[index], field, form.active_field() == index);
        }
    }

    draw_help_text(
        frame,
        chunks[form.field_count()],
        &format!(" {switch_hint} {AUTH_MODE_SHORTCUT} to switch"),
    );
}
