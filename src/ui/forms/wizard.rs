//! Formation wizard rendering

use super::field_renderer::{draw_field, FieldView, FIELD_HEIGHT, MULTILINE_FIELD_HEIGHT};
use crate::app::App;
use crate::config::PreparerInfo;
use crate::state::{
    FieldKind, FieldPath, FormationWizard, Step, WizardStatus, STEPS, TOTAL_STEPS,
};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Fee schedule shown on the preparer step
const FEE_LINES: &[(&str, &str)] = &[
    ("State Fee", "$150.00 + 3% processing fee (LLC/C-CORP)"),
    ("Regular Processing", "7-10 business days"),
    ("Expedited Fee", "$100 + 3% processing fee"),
    ("Expedited Processing", "24 hours"),
    ("CPA Fee", "$250"),
];

/// One vertical slot of a step body
enum Row {
    Heading(String),
    Field(FieldPath),
}

/// Draw the wizard: progress header, step body and navigation footer
pub fn draw_wizard(frame: &mut Frame, area: Rect, app: &App) {
    let wizard = &app.state.wizard;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Progress
            Constraint::Min(6),                // Step body
            Constraint::Length(1),             // Message
            Constraint::Length(BUTTON_HEIGHT), // Buttons
        ])
        .split(area);

    draw_progress(frame, chunks[0], wizard.step());

    let block = Block::default()
        .title(format!(" {} ", wizard.step().title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let body = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    match wizard.step() {
        Step::PreparerInformation => {
            draw_preparer_step(frame, body, wizard, app.preparer.as_ref())
        }
        step => draw_rows(frame, body, wizard, &rows_for(step, wizard)),
    }

    draw_message(frame, chunks[2], wizard);
    draw_buttons(frame, chunks[3], wizard);
}

fn draw_progress(frame: &mut Frame, area: Rect, current: Step) {
    let mut spans = vec![Span::styled(
        format!(" Step {} of {}  ", current.index(), TOTAL_STEPS),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for descriptor in STEPS.iter() {
        let (marker, color) = match descriptor.step.cmp(&current) {
            std::cmp::Ordering::Less => ("●", Color::Green),
            std::cmp::Ordering::Equal => ("◉", Color::Cyan),
            std::cmp::Ordering::Greater => ("○", Color::DarkGray),
        };
        spans.push(Span::styled(
            format!("{marker} {}  ", descriptor.title),
            Style::default().fg(color),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Layout rows for the field-driven steps
fn rows_for(step: Step, wizard: &FormationWizard) -> Vec<Row> {
    let mut rows = Vec::new();
    for path in step.editable_fields(&wizard.value) {
        match path {
            FieldPath::Owner(index, _) if is_first_field_of_entry(&rows, index) => {
                if let Some(owner) = wizard.value.owners.get(index) {
                    rows.push(Row::Heading(owner.heading()));
                }
            }
            FieldPath::Signature(index, _) if is_first_field_of_entry(&rows, index) => {
                if let Some(signature) = wizard.value.signatures.get(index) {
                    let name = wizard
                        .value
                        .owners
                        .get(index)
                        .map(|o| o.full_name.trim())
                        .filter(|n| !n.is_empty())
                        .unwrap_or("Owner");
                    rows.push(Row::Heading(format!(
                        "Signer {} ({name})",
                        signature.signer_number
                    )));
                }
            }
            _ => {}
        }
        rows.push(Row::Field(path));
    }
    rows
}

/// Whether no field of entry `index` has been laid out yet
fn is_first_field_of_entry(rows: &[Row], index: usize) -> bool {
    !rows.iter().any(|row| {
        matches!(
            row,
            Row::Field(FieldPath::Owner(i, _) | FieldPath::Signature(i, _)) if *i == index
        )
    })
}

fn field_view<'a>(
    path: FieldPath,
    wizard: &'a FormationWizard,
    label: &'a str,
    value: &'a str,
) -> FieldView<'a> {
    FieldView {
        label,
        value,
        is_active: wizard.active_path() == Some(path),
        is_multiline: path.is_multiline(),
        error: wizard.error_for(&path),
    }
}

fn row_height(row: &Row) -> u16 {
    match row {
        Row::Heading(_) => 1,
        Row::Field(path) if path.is_multiline() => MULTILINE_FIELD_HEIGHT,
        Row::Field(_) => FIELD_HEIGHT,
    }
}

/// First row to draw so the active field stays visible
fn scroll_start(rows: &[Row], active: Option<FieldPath>, height: u16) -> usize {
    let Some(active_index) = rows
        .iter()
        .position(|row| matches!(row, Row::Field(p) if Some(*p) == active))
    else {
        return 0;
    };

    let mut start = 0;
    let mut used: u16 = rows[..=active_index].iter().map(row_height).sum();
    while used > height && start < active_index {
        used -= row_height(&rows[start]);
        start += 1;
    }
    // Keep an entry heading together with its first field
    if start > 0 && matches!(rows[start - 1], Row::Heading(_)) && used < height {
        start -= 1;
    }
    start
}

fn draw_rows(frame: &mut Frame, area: Rect, wizard: &FormationWizard, rows: &[Row]) {
    let start = scroll_start(rows, wizard.active_path(), area.height);
    let mut y = area.y;

    for row in &rows[start..] {
        let height = row_height(row);
        if y + height > area.y + area.height {
            break;
        }
        let slot = Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        };
        match row {
            Row::Heading(text) => {
                let heading = Paragraph::new(Span::styled(
                    text.as_str(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
                frame.render_widget(heading, slot);
            }
            Row::Field(path) => draw_path(frame, slot, wizard, *path),
        }
        y += height;
    }
}

fn draw_path(frame: &mut Frame, area: Rect, wizard: &FormationWizard, path: FieldPath) {
    let label = path.label();
    let value = match path.kind() {
        FieldKind::Choice => format!("◀ {} ▶", path.display_value(&wizard.value)),
        _ => path.display_value(&wizard.value),
    };
    draw_field(frame, area, &field_view(path, wizard, &label, &value));
}

fn draw_preparer_step(
    frame: &mut Frame,
    area: Rect,
    wizard: &FormationWizard,
    preparer: Option<&PreparerInfo>,
) {
    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled(
        "Preparer",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    match preparer {
        Some(info) => {
            for (label, value) in [
                ("Preparer Name", &info.name),
                ("Firm Name", &info.firm),
                ("Street", &info.street),
                ("City, State, Zip", &info.city_state_zip),
            ] {
                lines.push(Line::from(vec![
                    Span::styled(format!("{label}: "), label_style),
                    Span::raw(value.as_str()),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Preparer details are provided by the filing office.",
            label_style,
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Fee Information",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (label, value) in FEE_LINES {
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(*value),
        ]));
    }

    let info_height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(info_height),
            Constraint::Length(1),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[0]);

    let path = FieldPath::PreparerAcknowledged;
    let label = "Acknowledgment";
    let value = format!("{} {}", path.display_value(&wizard.value), path.label());
    draw_field(frame, chunks[2], &field_view(path, wizard, label, &value));
}

/// Text and color of the line above the buttons
fn message_line(wizard: &FormationWizard) -> (String, Color) {
    match (wizard.status(), &wizard.session.message) {
        (WizardStatus::Submitting, _) => ("Submitting...".to_string(), Color::Yellow),
        (WizardStatus::Submitted, Some(message)) => (message.clone(), Color::Green),
        (_, Some(message)) => {
            // Collection-level errors have no input box of their own
            let collection = wizard
                .session
                .errors
                .iter()
                .find(|(path, _)| path.kind() == FieldKind::Collection)
                .map(|(_, msg)| format!("{message}: {msg}"));
            (collection.unwrap_or_else(|| message.clone()), Color::Red)
        }
        (_, None) => (String::new(), Color::Reset),
    }
}

fn draw_message(frame: &mut Frame, area: Rect, wizard: &FormationWizard) {
    let (text, color) = message_line(wizard);
    frame.render_widget(
        Paragraph::new(format!(" {text}")).style(Style::default().fg(color)),
        area,
    );
}

fn draw_buttons(frame: &mut Frame, area: Rect, wizard: &FormationWizard) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Min(0),
            Constraint::Length(18),
        ])
        .split(area);

    let editing = wizard.status() == WizardStatus::Editing;
    render_button(
        frame,
        chunks[0],
        "◀ Previous",
        false,
        editing && !wizard.step().is_first(),
    );

    let forward = match (wizard.status(), wizard.step().is_terminal()) {
        (WizardStatus::Submitting, _) => "Submitting...",
        (_, true) => "Submit",
        (_, false) => "Next ▶",
    };
    render_button(frame, chunks[2], forward, editing, editing);
}
