//! Telemetry view-model: polling, reconciliation, and command dispatch.
//!
//! This is the reusable core the dashboard views compose. It owns the latest
//! fleet snapshot, orchestrates fetch cycles against an injected
//! [`ApiClient`], reconciles live data against the fixed fallback set, and
//! surfaces non-blocking notices for every degraded outcome.
//!
//! ## Fetch cycle contract
//!
//! Every cycle ends in exactly one of two states: live data displayed or
//! fallback data displayed. The snapshot set is replaced atomically, the
//! loading indicator clears on every exit path, and a cycle-wide provenance
//! flag marks the whole set (fallback substitution is all-or-nothing per
//! cycle, never per machine).
//!
//! Cycles carry a monotonic sequence number; an outcome arriving after a
//! newer one has been applied is discarded, so a slow stale response can
//! never overwrite fresher data.
//!
//! ## Task model
//!
//! Fetches run as spawned tokio tasks that report through an unbounded
//! channel; the single-threaded UI loop drains the channel each frame via
//! [`Telemetry::poll_updates`]. Stopping the poll timer aborts only the
//! timer task: in-flight fetches complete and their outcomes still apply
//! (unless superseded by sequence).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::types::{MachineVitals, PredictionResponse, VitalsModeStatus, VitalsSample};
use crate::api::{ApiClient, ApiError};
use crate::model::{FleetData, Machine, MachineStatus, SensorRanges, Vitals, VitalsHistory};

/// How many history samples to request per machine.
const HISTORY_FETCH_LIMIT: usize = 20;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A transient, dismissible notification for the status bar.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub detail: String,
}

/// Operator commands dispatched against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    StartSimulation,
    StopSimulation,
    TriggerCaution { duration_secs: u64 },
    TriggerCritical { duration_secs: u64 },
    ResetNormal,
    ClearLogs,
    SetMachineStatus { id: String, status: MachineStatus },
    Predict { id: String },
}

/// One completed per-machine vitals fetch cycle, applied jointly.
#[derive(Debug)]
struct VitalsCycle {
    entries: Vec<(String, MachineVitals, Vec<VitalsSample>)>,
    failures: usize,
}

/// Outcome messages from spawned fetch tasks.
#[derive(Debug)]
enum Update {
    Fleet {
        seq: u64,
        outcome: Result<Vec<Machine>, ApiError>,
    },
    Vitals {
        seq: u64,
        cycle: VitalsCycle,
    },
    Ranges(Result<SensorRanges, ApiError>),
    Mode(Result<VitalsModeStatus, ApiError>),
    Ack {
        label: &'static str,
        refresh_after: bool,
        outcome: Result<String, ApiError>,
    },
    Prediction {
        machine_id: String,
        outcome: Result<PredictionResponse, ApiError>,
    },
}

/// The telemetry view-model. One instance per mounted dashboard.
#[derive(Debug)]
pub struct Telemetry {
    rt: Handle,
    client: Arc<dyn ApiClient>,
    fallback: Vec<Machine>,

    fleet: Option<FleetData>,
    vitals: HashMap<String, MachineVitals>,
    history: VitalsHistory,
    ranges: SensorRanges,
    ranges_live: bool,
    mode: Option<VitalsModeStatus>,
    predictions: HashMap<String, PredictionResponse>,
    notices: Vec<Notice>,

    // Fleet cycles: issued counter is shared with the poll timer task;
    // applied advances only when an outcome lands.
    fleet_issued: Arc<AtomicU64>,
    fleet_applied: u64,
    vitals_issued: Arc<AtomicU64>,
    vitals_applied: u64,

    tx: mpsc::UnboundedSender<Update>,
    rx: mpsc::UnboundedReceiver<Update>,
    poll_task: Option<JoinHandle<()>>,
}

impl Telemetry {
    /// Create a view-model over the given transport and fallback dataset.
    pub fn new(rt: Handle, client: Arc<dyn ApiClient>, fallback: Vec<Machine>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rt,
            client,
            fallback,
            fleet: None,
            vitals: HashMap::new(),
            history: VitalsHistory::new(),
            ranges: SensorRanges::default(),
            ranges_live: false,
            mode: None,
            predictions: HashMap::new(),
            notices: Vec::new(),
            fleet_issued: Arc::new(AtomicU64::new(0)),
            fleet_applied: 0,
            vitals_issued: Arc::new(AtomicU64::new(0)),
            vitals_applied: 0,
            tx,
            rx,
            poll_task: None,
        }
    }

    /// The latest applied snapshot set, if any cycle has completed.
    pub fn fleet(&self) -> Option<&FleetData> {
        self.fleet.as_ref()
    }

    /// Latest per-machine vitals from the narrower refresh cycle.
    pub fn vitals_for(&self, machine_id: &str) -> Option<&MachineVitals> {
        self.vitals.get(machine_id)
    }

    pub fn history(&self) -> &VitalsHistory {
        &self.history
    }

    /// The sensor range configuration; backend-served once fetched, shipped
    /// defaults until then.
    pub fn ranges(&self) -> &SensorRanges {
        &self.ranges
    }

    pub fn mode(&self) -> Option<&VitalsModeStatus> {
        self.mode.as_ref()
    }

    pub fn simulation_running(&self) -> bool {
        self.mode.as_ref().map(|m| m.simulation_running).unwrap_or(false)
    }

    /// Latest on-demand ML prediction for a machine.
    pub fn prediction_for(&self, machine_id: &str) -> Option<&PredictionResponse> {
        self.predictions.get(machine_id)
    }

    /// True while a fleet cycle is in flight. Guaranteed to clear on every
    /// cycle completion, success or failure.
    pub fn loading(&self) -> bool {
        self.fleet_applied < self.fleet_issued.load(Ordering::Relaxed)
    }

    /// Description of the backend transport, for the status bar.
    pub fn description(&self) -> &str {
        self.client.description()
    }

    /// Issue one fleet fetch cycle.
    pub fn request_refresh(&mut self) {
        let seq = next_seq(&self.fleet_issued);
        self.rt.spawn(fleet_cycle(self.client.clone(), self.tx.clone(), seq));
    }

    /// Issue a narrower per-machine vitals refresh for the given machines.
    ///
    /// Current vitals and recent history are fetched concurrently per
    /// machine and applied jointly, so the aggregated view never renders a
    /// half-updated state.
    pub fn request_vitals_refresh(&mut self, machine_ids: Vec<String>) {
        if machine_ids.is_empty() {
            return;
        }
        let seq = next_seq(&self.vitals_issued);
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let handles: Vec<_> = machine_ids
                .into_iter()
                .map(|id| {
                    let client = client.clone();
                    tokio::spawn(async move {
                        let current = client.machine_current_vitals(&id).await;
                        let history = client.machine_vitals_history(&id, HISTORY_FETCH_LIMIT).await;
                        (id, current, history)
                    })
                })
                .collect();

            let mut entries = Vec::new();
            let mut failures = 0;
            for handle in handles {
                match handle.await {
                    Ok((id, Ok(current), history)) => {
                        entries.push((id, current, history.unwrap_or_default()));
                    }
                    Ok((id, Err(e), _)) => {
                        debug!(machine = %id, error = %e, "vitals fetch failed");
                        failures += 1;
                    }
                    Err(e) => {
                        debug!(error = %e, "vitals fetch task failed");
                        failures += 1;
                    }
                }
            }
            let _ = tx.send(Update::Vitals {
                seq,
                cycle: VitalsCycle { entries, failures },
            });
        });
    }

    /// Fetch the sensor range configuration.
    pub fn request_ranges_refresh(&mut self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let _ = tx.send(Update::Ranges(client.sensor_ranges().await));
        });
    }

    /// Fetch the current simulation mode status.
    pub fn request_mode_refresh(&mut self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let _ = tx.send(Update::Mode(client.vitals_status().await));
        });
    }

    /// Start the recurring poll timer. Starting while already running is a
    /// no-op; the first cycle fires immediately.
    pub fn start_polling(&mut self, interval: std::time::Duration) {
        if let Some(task) = &self.poll_task {
            if !task.is_finished() {
                debug!("poll timer already running");
                return;
            }
        }
        info!(interval_ms = interval.as_millis() as u64, "poll timer started");
        let client = self.client.clone();
        let tx = self.tx.clone();
        let issued = self.fleet_issued.clone();
        let handle = self.rt.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Each cycle runs as its own task so aborting the timer
                // never cancels an in-flight fetch.
                let seq = next_seq(&issued);
                tokio::spawn(fleet_cycle(client.clone(), tx.clone(), seq));
            }
        });
        self.poll_task = Some(handle);
    }

    /// Stop the poll timer. No further cycles are scheduled; in-flight
    /// fetches still complete and their results are applied.
    pub fn stop_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
            info!("poll timer stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Dispatch an operator command as a background task. The acknowledgment
    /// (or failure) surfaces as a notice on a later [`Self::poll_updates`].
    pub fn dispatch(&mut self, command: Command) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        match command {
            Command::StartSimulation => {
                self.rt.spawn(async move {
                    let outcome = client.start_simulation().await;
                    let _ = tx.send(Update::Ack {
                        label: "Start simulation",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::StopSimulation => {
                self.rt.spawn(async move {
                    let outcome = client.stop_simulation().await;
                    let _ = tx.send(Update::Ack {
                        label: "Stop simulation",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::TriggerCaution { duration_secs } => {
                self.rt.spawn(async move {
                    let outcome = client.trigger_caution(duration_secs).await;
                    let _ = tx.send(Update::Ack {
                        label: "Trigger caution mode",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::TriggerCritical { duration_secs } => {
                self.rt.spawn(async move {
                    let outcome = client.trigger_critical(duration_secs).await;
                    let _ = tx.send(Update::Ack {
                        label: "Trigger critical mode",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::ResetNormal => {
                self.rt.spawn(async move {
                    let outcome = client.reset_normal().await;
                    let _ = tx.send(Update::Ack {
                        label: "Reset to normal",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::ClearLogs => {
                self.rt.spawn(async move {
                    let outcome = client.clear_logs().await;
                    let _ = tx.send(Update::Ack {
                        label: "Clear logs",
                        refresh_after: false,
                        outcome,
                    });
                });
            }
            Command::SetMachineStatus { id, status } => {
                self.rt.spawn(async move {
                    let outcome = client.update_machine_status(&id, status).await;
                    let _ = tx.send(Update::Ack {
                        label: "Machine status",
                        refresh_after: true,
                        outcome,
                    });
                });
            }
            Command::Predict { id } => {
                let vitals = self
                    .vitals
                    .get(&id)
                    .map(|v| Vitals {
                        temperature: v.temperature,
                        pressure: v.pressure,
                        vibration: v.vibration,
                        timestamp: v.timestamp.clone(),
                    })
                    .or_else(|| {
                        self.fleet.as_ref().and_then(|f| f.machine(&id)).map(|m| m.vitals.clone())
                    });
                let Some(vitals) = vitals else {
                    self.push_notice(
                        NoticeKind::Warning,
                        "No vitals available",
                        format!("no readings known for machine {id}"),
                    );
                    return;
                };
                let window = self.history.prediction_window(&id, &vitals);
                self.rt.spawn(async move {
                    let outcome = client.predict(&window).await;
                    let _ = tx.send(Update::Prediction {
                        machine_id: id,
                        outcome,
                    });
                });
            }
        }
    }

    /// Drain completed fetch outcomes and apply them.
    ///
    /// Non-blocking; intended to be called once per UI frame. Returns true
    /// if any state changed.
    pub fn poll_updates(&mut self) -> bool {
        let mut changed = false;
        while let Ok(update) = self.rx.try_recv() {
            changed |= self.apply_update(update);
        }
        changed
    }

    /// Take the accumulated notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply_update(&mut self, update: Update) -> bool {
        match update {
            Update::Fleet { seq, outcome } => {
                if seq <= self.fleet_applied {
                    debug!(seq, applied = self.fleet_applied, "discarding stale fleet outcome");
                    return false;
                }
                self.fleet_applied = seq;
                match outcome {
                    Ok(machines) if !machines.is_empty() => {
                        debug!(seq, count = machines.len(), "live fleet snapshot applied");
                        for machine in &machines {
                            self.history.record(&machine.id, &machine.vitals);
                        }
                        self.fleet = Some(FleetData::from_machines(machines, true));
                        self.chain_narrow_refreshes();
                    }
                    Ok(_) => {
                        warn!(seq, "backend returned no machines, substituting fallback");
                        self.substitute_fallback();
                        self.push_notice(
                            NoticeKind::Warning,
                            "No machines returned",
                            "Using local fallback machines.",
                        );
                    }
                    Err(e) => {
                        warn!(seq, error = %e, "fleet fetch failed, substituting fallback");
                        self.substitute_fallback();
                        self.push_notice(NoticeKind::Error, e.category(), e.to_string());
                    }
                }
                true
            }
            Update::Vitals { seq, cycle } => {
                if seq <= self.vitals_applied {
                    debug!(seq, "discarding stale vitals outcome");
                    return false;
                }
                self.vitals_applied = seq;
                if cycle.entries.is_empty() {
                    if cycle.failures > 0 {
                        warn!(failures = cycle.failures, "vitals cycle produced no data");
                    }
                    return false;
                }
                for (id, current, fetched_history) in cycle.entries {
                    // Seed the ring from backend history so sparklines have
                    // depth on the first cycle.
                    if self.history.is_empty(&id) {
                        for sample in &fetched_history {
                            self.history.record(
                                &id,
                                &Vitals {
                                    temperature: sample.temperature,
                                    pressure: sample.pressure,
                                    vibration: sample.vibration,
                                    timestamp: Some(sample.timestamp.clone()),
                                },
                            );
                        }
                    }
                    self.vitals.insert(id, current);
                }
                true
            }
            Update::Ranges(outcome) => match outcome {
                Ok(ranges) => {
                    info!("sensor ranges loaded from backend");
                    self.ranges = ranges;
                    self.ranges_live = true;
                    true
                }
                Err(e) => {
                    debug!(error = %e, "ranges fetch failed, keeping defaults");
                    false
                }
            },
            Update::Mode(outcome) => match outcome {
                Ok(mode) => {
                    self.mode = Some(mode);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "mode status fetch failed");
                    false
                }
            },
            Update::Ack {
                label,
                refresh_after,
                outcome,
            } => {
                match outcome {
                    Ok(message) => {
                        info!(label, %message, "command acknowledged");
                        self.push_notice(NoticeKind::Info, label, message);
                        if refresh_after {
                            self.request_refresh();
                        }
                    }
                    Err(e) => {
                        warn!(label, error = %e, "command failed");
                        self.push_notice(NoticeKind::Error, label, e.to_string());
                    }
                }
                true
            }
            Update::Prediction {
                machine_id,
                outcome,
            } => {
                match outcome {
                    Ok(prediction) => {
                        self.push_notice(
                            NoticeKind::Info,
                            "Prediction",
                            format!(
                                "failure probability {:.0}%",
                                prediction.probability_failure * 100.0
                            ),
                        );
                        self.predictions.insert(machine_id, prediction);
                    }
                    Err(e) => {
                        self.push_notice(NoticeKind::Error, "Prediction failed", e.to_string());
                    }
                }
                true
            }
        }
    }

    /// Replace the snapshot set with the fallback fleet, tagged non-live.
    fn substitute_fallback(&mut self) {
        self.fleet = Some(FleetData::from_machines(self.fallback.clone(), false));
    }

    /// After a live fleet apply, ride the cycle with the narrower refreshes:
    /// per-machine vitals, simulation mode, and ranges until loaded.
    fn chain_narrow_refreshes(&mut self) {
        let ids: Vec<String> = self
            .fleet
            .as_ref()
            .map(|f| f.machines.iter().map(|m| m.id.clone()).collect())
            .unwrap_or_default();
        self.request_vitals_refresh(ids);
        self.request_mode_refresh();
        if !self.ranges_live {
            self.request_ranges_refresh();
        }
    }

    fn push_notice(
        &mut self,
        kind: NoticeKind,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.notices.push(Notice {
            kind,
            title: title.into(),
            detail: detail.into(),
        });
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

fn next_seq(counter: &Arc<AtomicU64>) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

/// One fleet fetch cycle: fetch the machine collection and report the
/// outcome. Always sends exactly one update, so the loading flag always
/// clears.
async fn fleet_cycle(
    client: Arc<dyn ApiClient>,
    tx: mpsc::UnboundedSender<Update>,
    seq: u64,
) {
    debug!(seq, "fleet fetch cycle started");
    let outcome = client.machines().await;
    let _ = tx.send(Update::Fleet { seq, outcome });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::api::types::{
        CurrentReadings, PredictionRecord, SimulationStatus, VitalsLogEntry,
    };
    use crate::model::fallback_machines;
    use crate::model::machine::{HealthState, MachineType};

    fn stub_err() -> ApiError {
        ApiError::Api("not stubbed".to_string())
    }

    fn live_machine(id: &str, name: &str) -> Machine {
        Machine {
            id: id.to_string(),
            name: name.to_string(),
            machine_type: MachineType::HaulTruck,
            status: crate::model::MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Pit Area A".to_string(),
            description: String::new(),
            vitals: Vitals {
                temperature: 65.0,
                pressure: 110.0,
                vibration: 1.5,
                timestamp: Some("2024-08-01T10:00:00".to_string()),
            },
            operating_hours: 2500,
            efficiency: 88,
            last_maintenance: String::new(),
            next_maintenance: String::new(),
            failure_prediction: None,
            common_failures: Vec::new(),
            failure_descriptions: Default::default(),
            maintenance_history: Vec::new(),
        }
    }

    fn live_machines() -> Vec<Machine> {
        vec![
            live_machine("1", "Live HT-001"),
            live_machine("2", "Live DR-002"),
            live_machine("3", "Live EX-003"),
            live_machine("4", "Live CR-004"),
        ]
    }

    /// Test transport: scripted fleet outcomes, everything else unstubbed.
    #[derive(Debug, Default)]
    struct StubClient {
        fleet: Mutex<VecDeque<Result<Vec<Machine>, ApiError>>>,
        fleet_calls: AtomicUsize,
        fleet_delay: Option<Duration>,
        predict: Mutex<Option<Result<PredictionResponse, ApiError>>>,
    }

    impl StubClient {
        fn scripted(outcomes: Vec<Result<Vec<Machine>, ApiError>>) -> Self {
            Self {
                fleet: Mutex::new(outcomes.into()),
                ..Default::default()
            }
        }

        fn fleet_calls(&self) -> usize {
            self.fleet_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApiClient for StubClient {
        async fn machines(&self) -> Result<Vec<Machine>, ApiError> {
            self.fleet_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.fleet_delay {
                tokio::time::sleep(delay).await;
            }
            self.fleet.lock().unwrap().pop_front().unwrap_or_else(|| Ok(live_machines()))
        }

        async fn machine(&self, _id: &str) -> Result<Machine, ApiError> {
            Err(stub_err())
        }

        async fn current_vitals(&self) -> Result<CurrentReadings, ApiError> {
            Err(stub_err())
        }

        async fn machine_current_vitals(&self, _id: &str) -> Result<MachineVitals, ApiError> {
            Err(stub_err())
        }

        async fn machine_vitals_history(
            &self,
            _id: &str,
            _limit: usize,
        ) -> Result<Vec<VitalsSample>, ApiError> {
            Err(stub_err())
        }

        async fn vitals_history(&self, _limit: usize) -> Result<Vec<VitalsLogEntry>, ApiError> {
            Err(stub_err())
        }

        async fn sensor_ranges(&self) -> Result<SensorRanges, ApiError> {
            Err(stub_err())
        }

        async fn vitals_status(&self) -> Result<VitalsModeStatus, ApiError> {
            Err(stub_err())
        }

        async fn simulation_status(&self) -> Result<SimulationStatus, ApiError> {
            Err(stub_err())
        }

        async fn start_simulation(&self) -> Result<String, ApiError> {
            Ok("Simulation started successfully".to_string())
        }

        async fn stop_simulation(&self) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn trigger_caution(&self, _duration_secs: u64) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn trigger_critical(&self, _duration_secs: u64) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn reset_normal(&self) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn update_machine_status(
            &self,
            _id: &str,
            _status: MachineStatus,
        ) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn clear_logs(&self) -> Result<String, ApiError> {
            Err(stub_err())
        }

        async fn predict(
            &self,
            window: &[PredictionRecord],
        ) -> Result<PredictionResponse, ApiError> {
            assert!(window.len() >= 3, "prediction window must have at least 3 records");
            self.predict.lock().unwrap().take().unwrap_or_else(|| Err(stub_err()))
        }

        fn description(&self) -> &str {
            "stub"
        }
    }

    fn telemetry(client: Arc<StubClient>) -> Telemetry {
        Telemetry::new(Handle::current(), client, fallback_machines())
    }

    /// Drive the event loop until the in-flight fleet cycle completes.
    async fn wait_for_refresh(tel: &mut Telemetry) {
        for _ in 0..200 {
            tokio::task::yield_now().await;
            tel.poll_updates();
            if !tel.loading() {
                return;
            }
        }
        panic!("refresh did not complete");
    }

    #[tokio::test]
    async fn test_live_data_adopted() {
        let client = Arc::new(StubClient::scripted(vec![Ok(live_machines())]));
        let mut tel = telemetry(client);

        tel.request_refresh();
        assert!(tel.loading());
        wait_for_refresh(&mut tel).await;

        let fleet = tel.fleet().unwrap();
        assert!(fleet.live);
        assert_eq!(fleet.total(), 4);
        assert!(fleet.machines.iter().all(|m| m.name.starts_with("Live")));
        // A clean live cycle produces no notices.
        assert!(tel.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_substitutes_fallback() {
        let client = Arc::new(StubClient::scripted(vec![Ok(Vec::new())]));
        let mut tel = telemetry(client);

        tel.request_refresh();
        wait_for_refresh(&mut tel).await;

        let fleet = tel.fleet().unwrap();
        assert!(!fleet.live);
        assert_eq!(fleet.total(), 4);
        let ids: Vec<&str> = fleet.machines.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 4);

        let notices = tel.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "No machines returned");
        assert_eq!(notices[0].kind, NoticeKind::Warning);
    }

    #[tokio::test]
    async fn test_transport_failure_substitutes_fallback() {
        let client = Arc::new(StubClient::scripted(vec![Err(ApiError::Transport(
            "connection refused".to_string(),
        ))]));
        let mut tel = telemetry(client);

        tel.request_refresh();
        wait_for_refresh(&mut tel).await;

        let fleet = tel.fleet().unwrap();
        assert!(!fleet.live);
        assert_eq!(fleet.total(), 4);
        assert!(!tel.loading());

        let notices = tel.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].title, "Backend unreachable");
    }

    #[tokio::test]
    async fn test_logical_failure_substitutes_fallback() {
        let client = Arc::new(StubClient::scripted(vec![Err(ApiError::Api(
            "internal error".to_string(),
        ))]));
        let mut tel = telemetry(client);

        tel.request_refresh();
        wait_for_refresh(&mut tel).await;

        assert!(!tel.fleet().unwrap().live);
        assert!(!tel.loading());
    }

    #[tokio::test]
    async fn test_snapshot_replaced_atomically() {
        let client = Arc::new(StubClient::scripted(vec![Ok(live_machines()), Ok(Vec::new())]));
        let mut tel = telemetry(client);

        tel.request_refresh();
        wait_for_refresh(&mut tel).await;
        assert!(tel.fleet().unwrap().live);

        tel.request_refresh();
        wait_for_refresh(&mut tel).await;

        // The whole set flipped to fallback; no live machine survived.
        let fleet = tel.fleet().unwrap();
        assert!(!fleet.live);
        assert!(fleet.machines.iter().all(|m| !m.name.starts_with("Live")));
    }

    #[tokio::test]
    async fn test_stale_outcome_discarded() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client);

        // A newer cycle applies first.
        assert!(tel.apply_update(Update::Fleet {
            seq: 2,
            outcome: Ok(live_machines()),
        }));
        assert!(tel.fleet().unwrap().live);

        // A slow stale cycle resolving afterwards must not overwrite it.
        assert!(!tel.apply_update(Update::Fleet {
            seq: 1,
            outcome: Ok(Vec::new()),
        }));
        let fleet = tel.fleet().unwrap();
        assert!(fleet.live);
        assert!(fleet.machines.iter().all(|m| m.name.starts_with("Live")));
        assert!(tel.take_notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polling_is_idempotent() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client.clone());

        tel.start_polling(Duration::from_secs(5));
        tel.start_polling(Duration::from_secs(5));
        assert!(tel.is_polling());

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(11)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        // Immediate first tick plus two interval ticks. A duplicate timer
        // would have doubled this.
        let calls = client.fleet_calls();
        assert!((2..=3).contains(&calls), "unexpected fleet calls: {calls}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_polling_prevents_further_cycles() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client.clone());

        tel.start_polling(Duration::from_secs(5));
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(6)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        let before = client.fleet_calls();
        assert!(before >= 2);

        tel.stop_polling();
        assert!(!tel.is_polling());
        tokio::time::advance(Duration::from_secs(30)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(client.fleet_calls(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_cycle_applies_after_stop() {
        let client = Arc::new(StubClient {
            fleet_delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });
        let mut tel = telemetry(client);

        tel.request_refresh();
        tel.stop_polling();

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(2)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tel.poll_updates();

        assert!(!tel.loading());
        assert!(tel.fleet().unwrap().live);
    }

    #[tokio::test]
    async fn test_vitals_cycle_applied_jointly() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client);

        let current = MachineVitals {
            machine_id: "1".to_string(),
            machine_name: "Haul Truck HT-001".to_string(),
            machine_type: "Haul Truck".to_string(),
            temperature: 66.0,
            pressure: 111.0,
            vibration: 1.6,
            timestamp: Some("2024-08-01T10:01:00".to_string()),
            prediction: None,
        };
        let fetched = vec![VitalsSample {
            timestamp: "2024-08-01T10:00:00".to_string(),
            temperature: 65.0,
            pressure: 110.0,
            vibration: 1.5,
        }];

        assert!(tel.apply_update(Update::Vitals {
            seq: 1,
            cycle: VitalsCycle {
                entries: vec![("1".to_string(), current, fetched)],
                failures: 0,
            },
        }));

        assert_eq!(tel.vitals_for("1").unwrap().temperature, 66.0);
        // Ring seeded from backend history.
        assert_eq!(tel.history().len("1"), 1);

        // Stale vitals cycles are discarded too.
        assert!(!tel.apply_update(Update::Vitals {
            seq: 1,
            cycle: VitalsCycle {
                entries: Vec::new(),
                failures: 0,
            },
        }));
    }

    #[tokio::test]
    async fn test_command_ack_produces_notice() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client);

        tel.dispatch(Command::StartSimulation);
        for _ in 0..100 {
            tokio::task::yield_now().await;
            if tel.poll_updates() {
                break;
            }
        }

        let notices = tel.take_notices();
        assert!(notices.iter().any(|n| n.title == "Start simulation"
            && n.detail == "Simulation started successfully"));
        // A successful command chains a refresh.
        assert!(tel.loading());
    }

    #[tokio::test]
    async fn test_predict_without_data_warns() {
        let client = Arc::new(StubClient::default());
        let mut tel = telemetry(client);

        tel.dispatch(Command::Predict {
            id: "9".to_string(),
        });
        let notices = tel.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "No vitals available");
    }

    #[tokio::test]
    async fn test_predict_stores_result() {
        let client = Arc::new(StubClient::default());
        *client.predict.lock().unwrap() = Some(Ok(PredictionResponse {
            prediction: 1,
            probability_no_failure: 0.2,
            probability_failure: 0.8,
        }));
        let mut tel = telemetry(client.clone());

        tel.apply_update(Update::Fleet {
            seq: 1,
            outcome: Ok(live_machines()),
        });
        tel.dispatch(Command::Predict {
            id: "1".to_string(),
        });
        for _ in 0..100 {
            tokio::task::yield_now().await;
            tel.poll_updates();
            if tel.prediction_for("1").is_some() {
                break;
            }
        }

        let prediction = tel.prediction_for("1").unwrap();
        assert_eq!(prediction.prediction, 1);
        assert!(tel.take_notices().iter().any(|n| n.title == "Prediction"));
    }

    #[tokio::test]
    async fn test_loading_clears_on_every_path() {
        // Success path.
        let client = Arc::new(StubClient::scripted(vec![Ok(live_machines())]));
        let mut tel = telemetry(client);
        tel.request_refresh();
        wait_for_refresh(&mut tel).await;
        assert!(!tel.loading());

        // Failure path.
        let client = Arc::new(StubClient::scripted(vec![Err(ApiError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        })]));
        let mut tel = telemetry(client);
        tel.request_refresh();
        wait_for_refresh(&mut tel).await;
        assert!(!tel.loading());
    }
}
