//! Base dialog component

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Columns between the border and the text on each side
const PADDING: u16 = 2;

/// Configuration for rendering a dialog
pub struct DialogConfig<'a> {
    pub title: &'a str,
    /// Color of the title and border
    pub accent: Color,
    /// Message content, `\n` starts a new paragraph
    pub message: &'a str,
    /// Muted line under the message
    pub footer: Option<String>,
    /// Key hint shown at the bottom
    pub hint: Vec<Span<'a>>,
    pub max_width: u16,
}

/// Render a centered dialog overlay
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let inner_width = config.max_width.saturating_sub(2 * PADDING + 2) as usize;
    let wrapped = wrap_text(config.message, inner_width.max(1));

    let mut content = vec![
        Line::from(Span::styled(
            config.title,
            Style::default()
                .fg(config.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    content.extend(wrapped.into_iter().map(Line::from));
    if let Some(footer) = config.footer {
        content.push(Line::from(Span::styled(
            footer,
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !config.hint.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(config.hint));
    }

    let text_width = content.iter().map(Line::width).max().unwrap_or(0) as u16;
    let width = (text_width + 2 * PADDING + 2).min(config.max_width);
    let height = content.len() as u16 + 2;
    let area = centered(frame.area(), width, height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(config.accent))
        .style(Style::default().bg(Color::Black));
    let inner = Rect {
        x: area.x + PADDING,
        width: area.width.saturating_sub(2 * PADDING),
        ..block.inner(area)
    };
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(content), inner);
}

/// Rect of the given size centered in `outer`, clipped to it
fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

/// Word-wrap text to lines of at most `max_width` characters.
///
/// Words longer than a line are split.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > max_width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(max_width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            if current_len > 0 && current_len + 1 + chars.len() > max_width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += chars.len();
            current.extend(chars);
        }
        lines.push(current);
    }

    lines
}
