//! Vitals view rendering.
//!
//! Shows the selected machine's three sensors classified against the
//! configured ranges, with sparkline trends and the simulation mode banner.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::model::{Machine, SensorKind, Vitals};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Vitals view for the currently selected machine.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Mode banner
        Constraint::Length(2), // Machine line
        Constraint::Min(7),    // Sensor panels
    ])
    .split(area);

    render_mode_banner(frame, app, chunks[0]);

    let Some(machine) = app.selected_machine() else {
        let paragraph = Paragraph::new("No machine selected")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, chunks[1]);
        return;
    };

    render_machine_line(frame, app, machine, chunks[1]);

    let vitals = current_vitals(app, machine);
    let panels = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .split(chunks[2]);

    for (i, kind) in SensorKind::ALL.iter().enumerate() {
        render_sensor_panel(frame, app, machine, &vitals, *kind, panels[i]);
    }
}

/// The freshest readings for a machine: the narrower per-machine cycle when
/// available, the fleet snapshot otherwise.
fn current_vitals(app: &App, machine: &Machine) -> Vitals {
    if let Some(v) = app.telemetry.vitals_for(&machine.id) {
        return Vitals {
            temperature: v.temperature,
            pressure: v.pressure,
            vibration: v.vibration,
            timestamp: v.timestamp.clone(),
        };
    }
    machine.vitals.clone()
}

fn render_mode_banner(frame: &mut Frame, app: &App, area: Rect) {
    let (mode_text, mode_style) = match app.telemetry.mode() {
        Some(mode) => {
            let style = match mode.current_mode.as_str() {
                "critical" => Style::default()
                    .fg(app.theme.critical)
                    .add_modifier(Modifier::BOLD),
                "caution" => Style::default().fg(app.theme.warning),
                _ => Style::default().fg(app.theme.healthy),
            };
            let text = if mode.mode_remaining_seconds > 0.0 {
                format!(
                    "{} ({:.0}s remaining)",
                    mode.current_mode, mode.mode_remaining_seconds
                )
            } else {
                mode.current_mode.clone()
            };
            (text, style)
        }
        None => ("unknown".to_string(), Style::default().add_modifier(Modifier::DIM)),
    };

    let simulation = if app.telemetry.simulation_running() {
        Span::styled("running", Style::default().fg(app.theme.healthy))
    } else {
        Span::styled("stopped", Style::default().add_modifier(Modifier::DIM))
    };

    let line = Line::from(vec![
        Span::raw("Simulation: "),
        simulation,
        Span::raw("  Sensor mode: "),
        Span::styled(mode_text, mode_style),
        Span::raw("  [p:start/stop c:caution C:critical n:normal]"),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(paragraph, area);
}

fn render_machine_line(frame: &mut Frame, app: &App, machine: &Machine, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            machine.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {} · {}  ", machine.machine_type.label(), machine.location)),
        Span::styled(
            machine.status.label(),
            app.theme.machine_status_style(machine.status),
        ),
        Span::raw("  health: "),
        Span::styled(
            machine.health_status.symbol(),
            app.theme.health_style(machine.health_status),
        ),
        Span::raw("  [↑/↓ select machine]"),
    ])];

    // Per-machine prediction from the narrower vitals cycle, when present
    if let Some(prediction) =
        app.telemetry.vitals_for(&machine.id).and_then(|v| v.prediction.as_ref())
    {
        let eta = prediction
            .estimated_hours
            .as_ref()
            .map(|h| format!(" eta {h}h"))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(
                "prediction: {} risk {:.0}%{eta}",
                prediction.predicted_failure_type,
                prediction.failure_risk * 100.0
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_sensor_panel(
    frame: &mut Frame,
    app: &App,
    machine: &Machine,
    vitals: &Vitals,
    kind: SensorKind,
    area: Rect,
) {
    let range = app.telemetry.ranges().get(kind);
    let value = match kind {
        SensorKind::Temperature => vitals.temperature,
        SensorKind::Pressure => vitals.pressure,
        SensorKind::Vibration => vitals.vibration,
    };
    let status = range.classify(value);
    let sparkline = render_sparkline(&app.telemetry.history().sparkline(&machine.id, kind));

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{value:.2} {}", range.unit),
                app.theme.sensor_style(status).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(status.symbol(), app.theme.sensor_style(status)),
        ]),
        Line::from(Span::styled(
            format!("normal {:.1}-{:.1} {}", range.normal.min, range.normal.max, range.unit),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            format!("caution {:.1}-{:.1}", range.caution.min, range.caution.max),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(Span::styled(sparkline, Style::default().fg(app.theme.highlight))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", kind.label()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(app.theme.sensor_style(status)),
    );
    frame.render_widget(paragraph, area);
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "no trend data yet".to_string();
    }

    // Take the most recent values that fit a panel
    let values: Vec<u8> = data.iter().rev().take(24).rev().copied().collect();
    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sparkline_glyphs() {
        assert_eq!(render_sparkline(&[0, 3, 7]), "▁▄█");
        assert_eq!(render_sparkline(&[]), "no trend data yet");
    }

    #[test]
    fn test_render_sparkline_clamps() {
        // Out-of-range levels clamp to the tallest bar
        assert_eq!(render_sparkline(&[200]), "█");
    }
}
