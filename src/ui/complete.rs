//! Confirmation screen after a successful submission

use crate::app::App;
use crate::platform::COPY_SHORTCUT;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            app.state
                .wizard
                .session
                .message
                .as_deref()
                .unwrap_or("Application submitted"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(record) = &app.state.last_submission {
        let id = record
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.extend([
            Line::from(vec![
                Span::styled("Entity:       ", label_style),
                Span::raw(format!("{} ({})", record.entity_name, record.entity_type)),
            ]),
            Line::from(vec![
                Span::styled("Owners:       ", label_style),
                Span::raw(record.owners.len().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Expedited:    ", label_style),
                Span::raw(record.expedite.label()),
            ]),
            Line::from(vec![
                Span::styled("Status:       ", label_style),
                Span::styled("pending review", Style::default().fg(Color::Yellow)),
            ]),
            Line::from(vec![
                Span::styled("Application:  ", label_style),
                Span::styled(id, Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("{COPY_SHORTCUT} copies the application id"),
                label_style,
            )),
        ]);
    }

    let block = Block::default()
        .title(" Submitted ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}
