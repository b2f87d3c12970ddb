//! Application state and navigation logic.

use std::time::Instant;

use anyhow::Result;

use crate::model::Machine;
use crate::telemetry::{Command, NoticeKind, Telemetry};
use crate::ui::fleet::{sort_machines_by, SortColumn};
use crate::ui::Theme;

/// Caution mode duration requested by the operator key, in seconds.
const CAUTION_DURATION_SECS: u64 = 300;

/// Critical mode duration requested by the operator key, in seconds.
const CRITICAL_DURATION_SECS: u64 = 180;

/// The current view/tab in the TUI.
///
/// Machine detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overview of all machines with status, vitals, and risk.
    Fleet,
    /// Selected machine's sensors with range classification and trends.
    Vitals,
    /// Machines ordered by failure risk with recommended actions.
    Predictions,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Fleet => View::Vitals,
            View::Vitals => View::Predictions,
            View::Predictions => View::Fleet,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Fleet => View::Predictions,
            View::Vitals => View::Fleet,
            View::Predictions => View::Vitals,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Fleet => "Fleet",
            View::Vitals => "Vitals",
            View::Predictions => "Predictions",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    /// The telemetry view-model all views render from.
    pub telemetry: Telemetry,

    // Navigation state
    pub selected_machine_index: usize,

    // Sorting (Fleet view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App over the given telemetry view-model.
    pub fn new(telemetry: Telemetry) -> Self {
        Self {
            running: true,
            current_view: View::Fleet,
            show_help: false,
            show_detail_overlay: false,
            telemetry,
            selected_machine_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Per-frame maintenance: apply completed fetch outcomes, surface
    /// notices, and keep the selection in range.
    pub fn tick(&mut self) {
        if self.telemetry.poll_updates() {
            let count = self.visible_machines().len();
            if self.selected_machine_index >= count {
                self.selected_machine_index = count.saturating_sub(1);
            }
        }
        for notice in self.telemetry.take_notices() {
            let prefix = match notice.kind {
                NoticeKind::Info => "",
                NoticeKind::Warning => "warning: ",
                NoticeKind::Error => "error: ",
            };
            self.set_status_message(format!("{prefix}{}: {}", notice.title, notice.detail));
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (5 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(5) {
                return Some(msg);
            }
        }
        None
    }

    /// The machines visible in the current view, as (raw index, machine)
    /// pairs in display order.
    pub fn visible_machines(&self) -> Vec<(usize, &Machine)> {
        let Some(fleet) = self.telemetry.fleet() else {
            return Vec::new();
        };
        let mut machines: Vec<(usize, &Machine)> = fleet
            .machines
            .iter()
            .enumerate()
            .filter(|(_, m)| self.matches_filter(&m.name))
            .collect();
        match self.current_view {
            View::Fleet | View::Vitals => {
                sort_machines_by(&mut machines, self.sort_column, self.sort_ascending);
            }
            View::Predictions => {
                machines.sort_by(|a, b| {
                    b.1.risk_level()
                        .cmp(&a.1.risk_level())
                        .then_with(|| a.1.name.cmp(&b.1.name))
                });
            }
        }
        machines
    }

    /// The machine under the cursor in the current view's ordering.
    pub fn selected_machine(&self) -> Option<&Machine> {
        let machines = self.visible_machines();
        machines.get(self.selected_machine_index).map(|(_, m)| *m)
    }

    /// Switch to the next view (cycles Fleet → Vitals → Predictions).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_machines().len().saturating_sub(1);
        self.selected_machine_index = (self.selected_machine_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_machine_index = self.selected_machine_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_machine_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_machine_index = self.visible_machines().len().saturating_sub(1);
    }

    /// Open the detail overlay for the currently selected machine.
    pub fn enter_detail(&mut self) {
        if self.selected_machine().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to Fleet.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Fleet {
            self.current_view = View::Fleet;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Fleet/Vitals views).
    pub fn cycle_sort(&mut self) {
        if self.current_view != View::Predictions {
            self.sort_column = self.sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view != View::Predictions {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a machine name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Request an immediate fleet refresh.
    pub fn refresh(&mut self) {
        self.telemetry.request_refresh();
    }

    /// Start or stop the backend's vitals simulation.
    pub fn toggle_simulation(&mut self) {
        if self.telemetry.simulation_running() {
            self.telemetry.dispatch(Command::StopSimulation);
            self.set_status_message("Stopping simulation...".to_string());
        } else {
            self.telemetry.dispatch(Command::StartSimulation);
            self.set_status_message("Starting simulation...".to_string());
        }
    }

    /// Force the sensors into caution mode for a few minutes.
    pub fn trigger_caution(&mut self) {
        self.telemetry.dispatch(Command::TriggerCaution {
            duration_secs: CAUTION_DURATION_SECS,
        });
        self.set_status_message("Triggering caution mode...".to_string());
    }

    /// Force the sensors into critical mode.
    pub fn trigger_critical(&mut self) {
        self.telemetry.dispatch(Command::TriggerCritical {
            duration_secs: CRITICAL_DURATION_SECS,
        });
        self.set_status_message("Triggering critical mode...".to_string());
    }

    /// Reset the sensors to normal operation.
    pub fn reset_normal(&mut self) {
        self.telemetry.dispatch(Command::ResetNormal);
        self.set_status_message("Resetting sensors to normal...".to_string());
    }

    /// Clear the backend's vitals log file.
    pub fn clear_logs(&mut self) {
        self.telemetry.dispatch(Command::ClearLogs);
        self.set_status_message("Clearing vitals logs...".to_string());
    }

    /// Take the selected machine offline, or bring it back online.
    pub fn toggle_selected_machine(&mut self) {
        let Some((id, name, status)) = self
            .selected_machine()
            .map(|m| (m.id.clone(), m.name.clone(), m.status.toggled()))
        else {
            return;
        };
        self.telemetry.dispatch(Command::SetMachineStatus { id, status });
        self.set_status_message(format!("{name} -> {}...", status.label()));
    }

    /// Request an on-demand ML prediction for the selected machine.
    pub fn predict_selected(&mut self) {
        let Some((id, name)) = self.selected_machine().map(|m| (m.id.clone(), m.name.clone()))
        else {
            return;
        };
        self.telemetry.dispatch(Command::Predict { id });
        self.set_status_message(format!("Requesting prediction for {name}..."));
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current fleet state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(fleet) = self.telemetry.fleet() else {
            anyhow::bail!("No data to export");
        };

        let mut export = serde_json::Map::new();

        // Summary
        let mut summary = serde_json::Map::new();
        summary.insert("total_machines".to_string(), serde_json::json!(fleet.total()));
        summary.insert("online".to_string(), serde_json::json!(fleet.online_count()));
        summary.insert("critical".to_string(), serde_json::json!(fleet.critical_count()));
        summary.insert(
            "avg_efficiency".to_string(),
            serde_json::json!(fleet.avg_efficiency()),
        );
        summary.insert("live".to_string(), serde_json::json!(fleet.live));
        export.insert("summary".to_string(), serde_json::Value::Object(summary));

        // Machines
        let machines: Vec<serde_json::Value> = fleet
            .machines
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "type": m.machine_type.label(),
                    "status": m.status.label(),
                    "health": m.health_status.symbol(),
                    "temperature": m.vitals.temperature,
                    "pressure": m.vitals.pressure,
                    "vibration": m.vitals.vibration,
                    "risk_level": m.risk_level(),
                    "risk_bucket": m.risk_bucket().label()
                })
            })
            .collect();
        export.insert("machines".to_string(), serde_json::Value::Array(machines));

        let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::runtime::Handle;

    use crate::api::testutil::StaticClient;
    use crate::model::fallback_machines;

    #[test]
    fn test_view_cycling() {
        assert_eq!(View::Fleet.next(), View::Vitals);
        assert_eq!(View::Vitals.next(), View::Predictions);
        assert_eq!(View::Predictions.next(), View::Fleet);
        assert_eq!(View::Fleet.prev(), View::Predictions);
        assert_eq!(View::Fleet.label(), "Fleet");
    }

    async fn app_with_fleet() -> App {
        let client = Arc::new(StaticClient::new(fallback_machines()));
        let telemetry = Telemetry::new(Handle::current(), client, fallback_machines());
        let mut app = App::new(telemetry);
        app.refresh();
        for _ in 0..200 {
            tokio::task::yield_now().await;
            app.tick();
            if app.telemetry.fleet().is_some() {
                break;
            }
        }
        assert!(app.telemetry.fleet().is_some(), "fleet never loaded");
        app
    }

    #[tokio::test]
    async fn test_filter_narrows_visible_machines() {
        let mut app = app_with_fleet().await;
        assert_eq!(app.visible_machines().len(), 4);

        for c in "drill".chars() {
            app.filter_push(c);
        }
        let visible = app.visible_machines();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].1.name.contains("Drill"));

        app.clear_filter();
        assert_eq!(app.visible_machines().len(), 4);
    }

    #[tokio::test]
    async fn test_selection_stays_in_range() {
        let mut app = app_with_fleet().await;
        app.select_next_n(100);
        assert_eq!(app.selected_machine_index, 3);
        app.select_prev_n(100);
        assert_eq!(app.selected_machine_index, 0);
        app.select_last();
        assert_eq!(app.selected_machine_index, 3);
        assert!(app.selected_machine().is_some());
    }

    #[tokio::test]
    async fn test_predictions_view_orders_by_risk() {
        let mut app = app_with_fleet().await;
        app.set_view(View::Predictions);
        let visible = app.visible_machines();
        assert!(!visible.is_empty());
        let risks: Vec<u8> = visible.iter().map(|(_, m)| m.risk_level()).collect();
        let mut sorted = risks.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(risks, sorted);
    }

    #[tokio::test]
    async fn test_export_state() {
        let app = app_with_fleet().await;
        let file = tempfile::NamedTempFile::new().unwrap();
        app.export_state(file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["summary"]["total_machines"], 4);
        assert_eq!(value["summary"]["live"], true);
        assert_eq!(value["machines"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_export_without_data_fails() {
        let client = Arc::new(StaticClient::new(Vec::new()));
        let telemetry = Telemetry::new(Handle::current(), client, fallback_machines());
        let app = App::new(telemetry);
        assert!(app.export_state(std::path::Path::new("/tmp/never-written.json")).is_err());
    }
}
