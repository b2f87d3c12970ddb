//! Test-only transport that serves a fixed machine list.

use async_trait::async_trait;

use super::types::{
    CurrentReadings, MachineVitals, PredictionRecord, PredictionResponse, SimulationStatus,
    VitalsLogEntry, VitalsModeStatus, VitalsSample,
};
use super::{ApiClient, ApiError};
use crate::model::{Machine, MachineStatus, SensorRanges};

/// Serves the configured machines from `machines()`; every other endpoint
/// reports an `Api` failure.
#[derive(Debug)]
pub(crate) struct StaticClient {
    machines: Vec<Machine>,
}

impl StaticClient {
    pub(crate) fn new(machines: Vec<Machine>) -> Self {
        Self { machines }
    }
}

fn unavailable() -> ApiError {
    ApiError::Api("endpoint unavailable".to_string())
}

#[async_trait]
impl ApiClient for StaticClient {
    async fn machines(&self) -> Result<Vec<Machine>, ApiError> {
        Ok(self.machines.clone())
    }

    async fn machine(&self, id: &str) -> Result<Machine, ApiError> {
        self.machines.iter().find(|m| m.id == id).cloned().ok_or_else(unavailable)
    }

    async fn current_vitals(&self) -> Result<CurrentReadings, ApiError> {
        Err(unavailable())
    }

    async fn machine_current_vitals(&self, _id: &str) -> Result<MachineVitals, ApiError> {
        Err(unavailable())
    }

    async fn machine_vitals_history(
        &self,
        _id: &str,
        _limit: usize,
    ) -> Result<Vec<VitalsSample>, ApiError> {
        Err(unavailable())
    }

    async fn vitals_history(&self, _limit: usize) -> Result<Vec<VitalsLogEntry>, ApiError> {
        Err(unavailable())
    }

    async fn sensor_ranges(&self) -> Result<SensorRanges, ApiError> {
        Err(unavailable())
    }

    async fn vitals_status(&self) -> Result<VitalsModeStatus, ApiError> {
        Err(unavailable())
    }

    async fn simulation_status(&self) -> Result<SimulationStatus, ApiError> {
        Err(unavailable())
    }

    async fn start_simulation(&self) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn stop_simulation(&self) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn trigger_caution(&self, _duration_secs: u64) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn trigger_critical(&self, _duration_secs: u64) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn reset_normal(&self) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn update_machine_status(
        &self,
        _id: &str,
        _status: MachineStatus,
    ) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn clear_logs(&self) -> Result<String, ApiError> {
        Err(unavailable())
    }

    async fn predict(&self, _window: &[PredictionRecord]) -> Result<PredictionResponse, ApiError> {
        Err(unavailable())
    }

    fn description(&self) -> &str {
        "static"
    }
}
