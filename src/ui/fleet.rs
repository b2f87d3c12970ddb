//! Fleet view rendering.
//!
//! Displays a table of all machines with operational status, health, current
//! vitals (classified against the sensor ranges), and failure risk.

use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::model::{Machine, SensorKind};

/// Column to sort by in the Fleet view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by machine name alphabetically.
    #[default]
    Name,
    /// Sort by machine class.
    Type,
    /// Sort by operational status.
    Status,
    /// Sort by health state.
    Health,
    /// Sort by predicted risk level.
    Risk,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Type,
            SortColumn::Type => SortColumn::Status,
            SortColumn::Status => SortColumn::Health,
            SortColumn::Health => SortColumn::Risk,
            SortColumn::Risk => SortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Type => "type",
            SortColumn::Status => "status",
            SortColumn::Health => "health",
            SortColumn::Risk => "risk",
        }
    }
}

/// Sort machines by the given column and direction (public for use by App).
pub fn sort_machines_by(
    machines: &mut [(usize, &Machine)],
    column: SortColumn,
    ascending: bool,
) {
    machines.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.1.name.cmp(&b.1.name),
            SortColumn::Type => a.1.machine_type.label().cmp(b.1.machine_type.label()),
            SortColumn::Status => a.1.status.label().cmp(b.1.status.label()),
            SortColumn::Health => a.1.health_status.cmp(&b.1.health_status),
            SortColumn::Risk => a.1.risk_level().cmp(&b.1.risk_level()),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        // Secondary sort by name for stability when primary values are equal
        if primary == std::cmp::Ordering::Equal {
            a.1.name.cmp(&b.1.name)
        } else {
            primary
        }
    });
}

/// Render the Fleet view showing all machines in a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let machines = app.visible_machines();
    let ranges = app.telemetry.ranges();
    let total = app.telemetry.fleet().map(|f| f.total()).unwrap_or(0);

    let header = Row::new(vec![
        Cell::from(format_header("Machine", SortColumn::Name, app)),
        Cell::from(format_header("Type", SortColumn::Type, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from(format_header("Health", SortColumn::Health, app)),
        Cell::from("Temp"),
        Cell::from("Press"),
        Cell::from("Vib"),
        Cell::from(format_header("Risk", SortColumn::Risk, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = machines
        .iter()
        .map(|(_, m)| {
            let temp_status = ranges.classify(SensorKind::Temperature, m.vitals.temperature);
            let press_status = ranges.classify(SensorKind::Pressure, m.vitals.pressure);
            let vib_status = ranges.classify(SensorKind::Vibration, m.vitals.vibration);

            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(m.machine_type.label()),
                Cell::from(m.status.label()).style(app.theme.machine_status_style(m.status)),
                Cell::from(m.health_status.symbol())
                    .style(app.theme.health_style(m.health_status)),
                Cell::from(format!("{:.1}", m.vitals.temperature))
                    .style(app.theme.sensor_style(temp_status)),
                Cell::from(format!("{:.1}", m.vitals.pressure))
                    .style(app.theme.sensor_style(press_status)),
                Cell::from(format!("{:.2}", m.vitals.vibration))
                    .style(app.theme.sensor_style(vib_status)),
                Cell::from(format!("{:>3}% {}", m.risk_level(), m.risk_bucket().label()))
                    .style(app.theme.risk_style(m.risk_bucket())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Machine name - gets the largest share
        Constraint::Fill(2), // Type
        Constraint::Min(11), // Status
        Constraint::Min(6),  // Health
        Constraint::Min(6),  // Temp
        Constraint::Min(6),  // Press
        Constraint::Min(5),  // Vib
        Constraint::Min(13), // Risk
    ];

    let selected_visual_index = app.selected_machine_index.min(machines.len().saturating_sub(1));

    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !machines.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, machines.len())
    } else {
        String::new()
    };

    let title = format!(
        " Machines ({}/{}) [s:sort {}{}]{}{} ",
        machines.len(),
        total,
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(ratatui::style::Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col && app.current_view != crate::app::View::Predictions {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}
