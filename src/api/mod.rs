//! HTTP boundary to the machine/prediction backend.
//!
//! This module provides a trait-based abstraction over the transport
//! ([`ApiClient`]) so the telemetry view-model can be driven by the real
//! reqwest implementation ([`HttpApiClient`]) or by a fake in tests, plus the
//! error taxonomy every call site degrades through.

mod http;
#[cfg(test)]
pub(crate) mod testutil;
pub mod types;

pub use http::HttpApiClient;
pub use types::{
    CurrentReadings, MachineVitals, PredictionRecord, PredictionResponse, SimulationStatus,
    VitalsLogEntry, VitalsModeStatus, VitalsSample,
};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::model::{Machine, MachineStatus, SensorRanges};

/// Failure classification for backend calls.
///
/// All four kinds degrade identically at the call site (fallback data plus a
/// dismissible notice); the distinction exists so the notice can describe the
/// failure in plain language.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Network unreachable, connection refused, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be parsed as the expected shape.
    #[error("unexpected response: {0}")]
    Schema(String),

    /// A well-formed response that signals failure (`success: false`).
    #[error("backend error: {0}")]
    Api(String),
}

impl ApiError {
    /// Plain-language category for user-facing notices.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "Backend unreachable",
            ApiError::Status { .. } => "Backend request failed",
            ApiError::Schema(_) => "Backend returned unexpected response",
            ApiError::Api(_) => "Backend reported an error",
        }
    }
}

/// Transport abstraction over the backend's HTTP surface.
///
/// One method per endpoint. Implementations must be cheap to clone behind an
/// `Arc` and safe to call from spawned tasks.
///
/// # Example
///
/// ```no_run
/// use vitalwatch::api::{ApiClient, HttpApiClient};
///
/// # tokio_test::block_on(async {
/// let client = HttpApiClient::new("http://localhost:5000").unwrap();
/// let machines = client.machines().await.unwrap();
/// println!("{} machines", machines.len());
/// # });
/// ```
#[async_trait]
pub trait ApiClient: Send + Sync + Debug {
    /// `GET /machine/machines` — the machine collection with vitals and
    /// predictions.
    async fn machines(&self) -> Result<Vec<Machine>, ApiError>;

    /// `GET /machine/machines/{id}` — one machine with maintenance history.
    async fn machine(&self, id: &str) -> Result<Machine, ApiError>;

    /// `GET /machine/vitals/current` — fleet-wide simulator readings.
    async fn current_vitals(&self) -> Result<CurrentReadings, ApiError>;

    /// `GET /machine/machines/{id}/vitals/current`.
    async fn machine_current_vitals(&self, id: &str) -> Result<MachineVitals, ApiError>;

    /// `GET /machine/machines/{id}/vitals/history?limit=N`, oldest first.
    async fn machine_vitals_history(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<VitalsSample>, ApiError>;

    /// `GET /machine/vitals/history?limit=N` — raw fleet log lines.
    async fn vitals_history(&self, limit: usize) -> Result<Vec<VitalsLogEntry>, ApiError>;

    /// `GET /machine/vitals/ranges` — per-sensor threshold configuration.
    async fn sensor_ranges(&self) -> Result<SensorRanges, ApiError>;

    /// `GET /machine/vitals/status` — current simulation mode.
    async fn vitals_status(&self) -> Result<VitalsModeStatus, ApiError>;

    /// `GET /machine/simulation/status`.
    async fn simulation_status(&self) -> Result<SimulationStatus, ApiError>;

    /// `POST /machine/simulation/start`. Returns the server message.
    async fn start_simulation(&self) -> Result<String, ApiError>;

    /// `POST /machine/simulation/stop`.
    async fn stop_simulation(&self) -> Result<String, ApiError>;

    /// `POST /machine/vitals/trigger-caution` with `{duration}` seconds.
    async fn trigger_caution(&self, duration_secs: u64) -> Result<String, ApiError>;

    /// `POST /machine/vitals/trigger-critical` with `{duration}` seconds.
    async fn trigger_critical(&self, duration_secs: u64) -> Result<String, ApiError>;

    /// `POST /machine/vitals/reset-normal`.
    async fn reset_normal(&self) -> Result<String, ApiError>;

    /// `PATCH /machine/machines/{id}/status` with `{status}`.
    async fn update_machine_status(
        &self,
        id: &str,
        status: MachineStatus,
    ) -> Result<String, ApiError>;

    /// `DELETE /machine/vitals/clear-logs`.
    async fn clear_logs(&self) -> Result<String, ApiError>;

    /// `POST /ml/predict` with an ordered window of at least 3 records.
    async fn predict(&self, window: &[PredictionRecord]) -> Result<PredictionResponse, ApiError>;

    /// Human-readable description of the backend, for the status bar.
    fn description(&self) -> &str;
}
