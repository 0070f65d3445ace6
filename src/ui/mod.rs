//! UI module for rendering the TUI

mod complete;
mod components;
mod forms;
mod layout;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (header_area, main_area) = layout::create_layout(frame.area());

    layout::draw_header(frame, header_area, app);

    // Draw main content based on current view
    match app.state.current_view {
        View::Auth => forms::draw_auth(frame, main_area, app),
        View::Wizard => forms::draw_wizard(frame, main_area, app),
        View::Submitted => complete::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Error dialog on top of everything
    if let Some(error) = app.state.current_error() {
        components::render_error_dialog(frame, error, app.state.queued_errors());
    }
}
