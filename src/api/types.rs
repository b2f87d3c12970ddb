//! Wire types for the backend HTTP boundary.
//!
//! These match the JSON envelopes produced by the machine service and the
//! prediction service. Every read endpoint wraps its payload in a
//! `{success, data, ...}` envelope; mutation endpoints return
//! `{success, message}`; the ML endpoint returns a bare prediction object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::SensorStatus;

/// The standard response envelope around a payload of type `T`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The server-supplied failure description, if any.
    pub fn failure_message(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// One sensor reading from the fleet-wide vitals endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub value: f64,
    pub status: SensorStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Fleet-wide simulator readings (`GET /machine/vitals/current`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentReadings {
    pub temperature: SensorReading,
    pub pressure: SensorReading,
    pub vibration: SensorReading,
    pub overall_status: SensorStatus,
    #[serde(default)]
    pub forced_mode: Option<String>,
    #[serde(default)]
    pub mode_remaining: f64,
}

/// Hours-to-failure as reported by the prediction layer; either a number or
/// free text like `"N/A"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimatedHours {
    Hours(f64),
    Text(String),
}

impl fmt::Display for EstimatedHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatedHours::Hours(h) => write!(f, "{h:.0}"),
            EstimatedHours::Text(t) => f.write_str(t),
        }
    }
}

/// Prediction summary attached to per-machine vitals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsPrediction {
    pub failure_risk: f64,
    pub predicted_failure_type: String,
    #[serde(default)]
    pub estimated_hours: Option<EstimatedHours>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Per-machine current vitals (`GET /machine/machines/{id}/vitals/current`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineVitals {
    pub machine_id: String,
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub machine_type: String,
    pub temperature: f64,
    pub pressure: f64,
    pub vibration: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub prediction: Option<VitalsPrediction>,
}

/// One history sample as logged by the backend worker.
///
/// Field names are capitalized on the wire to match the training dataset
/// column names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalsSample {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Vibration")]
    pub vibration: f64,
}

/// One line of the fleet vitals log (`GET /machine/vitals/history`).
#[derive(Debug, Clone, Deserialize)]
pub struct VitalsLogEntry {
    pub timestamp: String,
    pub vitals: VitalsLogRecord,
}

/// The nested vitals payload inside a log line.
#[derive(Debug, Clone, Deserialize)]
pub struct VitalsLogRecord {
    #[serde(default)]
    pub machine_id: Option<String>,
    pub temperature: f64,
    pub pressure: f64,
    pub vibration: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Simulation loop status (`GET /machine/simulation/status`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub running: bool,
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Simulation mode status (`GET /machine/vitals/status`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsModeStatus {
    #[serde(default)]
    pub simulation_running: bool,
    pub current_mode: String,
    #[serde(default)]
    pub forced_mode: Option<String>,
    #[serde(default)]
    pub mode_remaining_seconds: f64,
}

/// One record of an ML prediction request window (`POST /ml/predict`).
///
/// The service computes rolling-window features, so a request must carry at
/// least three records ordered oldest to newest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Vibration")]
    pub vibration: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
}

/// Response from the ML prediction service. Not enveloped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 0 = no failure expected, 1 = failure expected.
    pub prediction: i64,
    pub probability_no_failure: f64,
    pub probability_failure: f64,
}
