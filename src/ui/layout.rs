//! Layout components (header, status bar)

use crate::app::App;
use crate::platform::{
    ADD_OWNER_SHORTCUT, AUTH_MODE_SHORTCUT, COPY_SHORTCUT, NEXT_STEP_SHORTCUT,
    PREV_STEP_SHORTCUT, SIGN_OUT_SHORTCUT, SUBMIT_SHORTCUT,
};
use crate::state::{FieldKind, FormationWizard, Step, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into header and content, reserving the bottom line for the status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the header line
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.state.current_view.title()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(email) = &app.state.signed_in_email {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("signed in as {email}"),
            Style::default().fg(Color::Blue),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::raw(" ")];

    // View-specific hints
    let hints = get_view_hints(app.state.current_view, &app.state.wizard);
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));

    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Yellow)));
    }

    // Copy message
    if let Some(msg) = &app.copy_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Render quit hint on the right
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: View, wizard: &FormationWizard) -> String {
    match view {
        View::Auth => format!("Tab:next  Enter:continue  {AUTH_MODE_SHORTCUT}:sign in/up"),
        View::Wizard => {
            let mut hints = vec!["Tab:next".to_string()];
            match wizard.active_path().map(|p| p.kind()) {
                Some(FieldKind::Choice) => hints.push("←/→:change".to_string()),
                Some(FieldKind::Checkbox) => hints.push("Space:toggle".to_string()),
                _ => {}
            }
            if wizard.step().is_terminal() {
                hints.push(format!("{SUBMIT_SHORTCUT}:submit"));
            } else {
                hints.push(format!("{NEXT_STEP_SHORTCUT}:next step"));
            }
            if !wizard.step().is_first() {
                hints.push(format!("{PREV_STEP_SHORTCUT}:back"));
            }
            if wizard.step() == Step::OwnerInformation {
                hints.push(format!("{ADD_OWNER_SHORTCUT}:add owner"));
            }
            hints.push(format!("{SIGN_OUT_SHORTCUT}:sign out"));
            hints.join("  ")
        }
        View::Submitted => {
            format!("n:new application  {COPY_SHORTCUT}:copy id  {SIGN_OUT_SHORTCUT}:sign out  q:quit")
        }
    }
}
