//! Machine detail overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::common::centered_rect;
use crate::app::App;

/// Render the detail overlay for the currently selected machine.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(machine) = app.selected_machine() else {
        return;
    };

    let popup = centered_rect(area.width.saturating_sub(10).min(78), 24, area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                machine.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  ({})", machine.machine_type.label())),
            Span::raw("  "),
            Span::styled(
                machine.status.label(),
                app.theme.machine_status_style(machine.status),
            ),
            Span::raw("  "),
            Span::styled(
                machine.health_status.symbol(),
                app.theme.health_style(machine.health_status),
            ),
        ]),
        Line::from(format!("{} — {}", machine.location, machine.description)),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!(
                "temp {:.1}  press {:.1}  vib {:.2}",
                machine.vitals.temperature, machine.vitals.pressure, machine.vitals.vibration
            )),
            Span::raw(format!(
                "  hours {}  eff {}%",
                machine.operating_hours, machine.efficiency
            )),
        ]),
        Line::from(format!(
            "maintenance: last {}  next {}",
            machine.last_maintenance, machine.next_maintenance
        )),
        Line::from(""),
    ];

    match &machine.failure_prediction {
        Some(p) => {
            let bucket = machine.risk_bucket();
            lines.push(Line::from(Span::styled(
                "Failure prediction",
                app.theme.header,
            )));
            lines.push(Line::from(vec![
                Span::raw("  risk "),
                Span::styled(
                    format!("{}% ({})", p.risk_level, bucket.label()),
                    app.theme.risk_style(bucket),
                ),
                Span::raw(format!("  confidence {}%", p.confidence)),
            ]));
            lines.push(Line::from(format!(
                "  {} — {}",
                p.predicted_failure_type, p.failure_description
            )));
            lines.push(Line::from(format!(
                "  time to failure: {}  priority: {}",
                p.estimated_time_to_failure,
                p.maintenance_priority.label()
            )));
            lines.push(Line::from(format!("  action: {}", p.recommended_action)));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No failure prediction available",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }

    if let Some(prediction) = app.telemetry.prediction_for(&machine.id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("ML spot prediction", app.theme.header)));
        let verdict = if prediction.prediction == 1 { "failure expected" } else { "no failure expected" };
        lines.push(Line::from(format!(
            "  {verdict}  (p_fail {:.0}%  p_ok {:.0}%)",
            prediction.probability_failure * 100.0,
            prediction.probability_no_failure * 100.0
        )));
    }

    if !machine.common_failures.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Known failure modes", app.theme.header)));
        lines.push(Line::from(format!("  {}", machine.common_failures.join(", "))));
    }

    if !machine.maintenance_history.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Maintenance history", app.theme.header)));
        for entry in machine.maintenance_history.iter().take(4) {
            lines.push(Line::from(format!(
                "  {} {} ({})",
                entry.date, entry.kind, entry.duration
            )));
        }
    }

    let title = format!(" Machine {} [Esc to close] ", machine.id);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );

    frame.render_widget(paragraph, popup);
}
