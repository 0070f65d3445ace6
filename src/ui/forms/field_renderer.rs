//! Field rendering utilities for forms

use crate::state::FormField;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows taken by a single-line field (borders + content)
pub const FIELD_HEIGHT: u16 = 3;

/// Rows taken by a multi-line field
pub const MULTILINE_FIELD_HEIGHT: u16 = 5;

/// Everything needed to draw one input box
pub struct FieldView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub is_active: bool,
    pub is_multiline: bool,
    /// Validation message shown on the bottom border
    pub error: Option<&'a str>,
}

/// Draw a bordered input box
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldView) {
    let accent = match (field.is_active, field.error.is_some()) {
        (_, true) => Color::Red,
        (true, false) => Color::Cyan,
        (false, false) => Color::DarkGray,
    };
    let text_style = if field.is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };

    let display = if field.value.is_empty() && !field.is_active {
        "(empty)"
    } else {
        field.value
    };
    let cursor = Span::styled(
        if field.is_active { "▌" } else { "" },
        Style::default().fg(Color::Cyan),
    );

    let content = if field.is_multiline {
        let mut lines: Vec<Line> = display
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
            .collect();
        if let Some(last) = lines.last_mut() {
            last.spans.push(cursor);
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![Span::styled(display, text_style), cursor]))
    };

    let mut block = Block::default()
        .title(format!(" {} ", field.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    if let Some(error) = field.error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// Draw a domain [`FormField`], masking secrets
pub fn draw_form_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let value = field.display_value();
    draw_field(
        frame,
        area,
        &FieldView {
            label: &field.label,
            value: &value,
            is_active,
            is_multiline: false,
            error: None,
        },
    );
}

/// Draw a line of muted help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
