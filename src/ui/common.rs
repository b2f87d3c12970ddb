//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::model::HealthState;

/// Render the header bar with fleet health overview.
///
/// Displays: status indicator, machine counts by state, average efficiency,
/// and the live/fallback provenance tag.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(fleet) = app.telemetry.fleet() else {
        let line = Line::from(vec![
            Span::styled(" VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading machine data..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let total = fleet.total();
    let online = fleet.online_count();
    let critical = fleet.critical_count();
    let warning =
        fleet.machines.iter().filter(|m| m.health_status == HealthState::Warning).count();

    // Overall status indicator follows the worst health in the fleet
    let status_style = if critical > 0 {
        app.theme.health_style(HealthState::Critical)
    } else if warning > 0 {
        app.theme.health_style(HealthState::Warning)
    } else {
        app.theme.health_style(HealthState::Good)
    };

    let provenance = if fleet.live { "LIVE" } else { "FALLBACK" };
    let loading = if app.telemetry.loading() { " ⟳" } else { "" };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{total}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" machines "),
        Span::styled(format!("{online}"), Style::default().fg(app.theme.healthy)),
        Span::raw(" online "),
        if critical > 0 {
            Span::styled(
                format!("{critical}"),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" crit │ "),
        Span::raw(format!("eff {}%", fleet.avg_efficiency())),
        Span::raw(" │ "),
        Span::styled(provenance, app.theme.provenance_style(fleet.live)),
        Span::raw(loading),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Fleet "),
        Line::from(" 2:Vitals "),
        Line::from(" 3:Predictions "),
    ];

    let selected = match app.current_view {
        View::Fleet => 0,
        View::Vitals => 1,
        View::Predictions => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("│");

    frame.render_widget(tabs, area);
}

/// Render the status bar with key hints, the data source, the simulation
/// mode, and any transient status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // A fresh status message takes the whole bar
    if let Some(message) = app.get_status_message() {
        let line = Line::from(vec![Span::styled(
            format!(" {message} "),
            Style::default().fg(app.theme.highlight),
        )]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mode = app
        .telemetry
        .mode()
        .map(|m| {
            if m.mode_remaining_seconds > 0.0 {
                format!("mode:{} ({:.0}s)", m.current_mode, m.mode_remaining_seconds)
            } else {
                format!("mode:{}", m.current_mode)
            }
        })
        .unwrap_or_else(|| "mode:?".to_string());

    let simulation = if app.telemetry.simulation_running() { "sim:on" } else { "sim:off" };

    let line = Line::from(vec![
        Span::styled(
            " q:quit ?:help r:refresh p:sim o:on/off m:predict e:export ",
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw("│ "),
        Span::raw(format!("{simulation} {mode} ")),
        Span::raw("│ "),
        Span::styled(
            app.telemetry.description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay listing all key bindings.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 22, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(Span::styled("Navigation", app.theme.header)),
        Line::from("  Tab / Shift-Tab   next / previous view"),
        Line::from("  1 / 2 / 3         Fleet / Vitals / Predictions"),
        Line::from("  j/k or ↑/↓        move selection"),
        Line::from("  Enter             machine detail overlay"),
        Line::from("  Esc / Backspace   back / close overlay"),
        Line::from(""),
        Line::from(Span::styled("Data", app.theme.header)),
        Line::from("  r                 refresh now"),
        Line::from("  s / S             cycle sort column / direction"),
        Line::from("  /                 filter machines, c clears"),
        Line::from("  e                 export fleet state to JSON"),
        Line::from(""),
        Line::from(Span::styled("Operator", app.theme.header)),
        Line::from("  p                 start/stop simulation"),
        Line::from("  c / C             trigger caution / critical mode"),
        Line::from("  n                 reset sensors to normal"),
        Line::from("  x                 clear backend vitals logs"),
        Line::from("  o                 take machine offline / online"),
        Line::from("  m                 run ML prediction for machine"),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help (any key to close) ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );

    frame.render_widget(paragraph, popup);
}

/// Compute a centered rectangle of the given width and height within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_contained() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 20, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(60, 22, area);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.height, 10);
    }
}
