//! Predictions view rendering.
//!
//! Machines ordered worst-risk first with predicted failure type, confidence,
//! time-to-failure, and the recommended action.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the Predictions view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let machines = app.visible_machines();

    let header = Row::new(vec![
        Cell::from("Machine"),
        Cell::from("Risk"),
        Cell::from("Predicted failure"),
        Cell::from("Conf"),
        Cell::from("ETA"),
        Cell::from("Priority"),
        Cell::from("Action"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = machines
        .iter()
        .map(|(_, m)| {
            let bucket = m.risk_bucket();
            match &m.failure_prediction {
                Some(p) => Row::new(vec![
                    Cell::from(m.name.clone()),
                    Cell::from(format!("{:>3}% {}", p.risk_level, bucket.label()))
                        .style(app.theme.risk_style(bucket)),
                    Cell::from(p.predicted_failure_type.clone()),
                    Cell::from(format!("{}%", p.confidence)),
                    Cell::from(p.estimated_time_to_failure.clone()),
                    Cell::from(p.maintenance_priority.label()),
                    Cell::from(p.recommended_action.clone()),
                ]),
                None => Row::new(vec![
                    Cell::from(m.name.clone()),
                    Cell::from("-"),
                    Cell::from("-"),
                    Cell::from("-"),
                    Cell::from("-"),
                    Cell::from("-"),
                    Cell::from("-"),
                ]),
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Machine
        Constraint::Min(13), // Risk
        Constraint::Fill(2), // Predicted failure
        Constraint::Min(5),  // Confidence
        Constraint::Min(10), // ETA
        Constraint::Min(8),  // Priority
        Constraint::Fill(3), // Action
    ];

    let selected_visual_index = app.selected_machine_index.min(machines.len().saturating_sub(1));

    let title = format!(" Failure predictions ({}) [worst first, m:predict] ", machines.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}
