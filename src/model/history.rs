//! Historical vitals tracking for sparklines and prediction windows.

use std::collections::{HashMap, VecDeque};

use chrono::{Duration as ChronoDuration, Utc};

use crate::api::types::PredictionRecord;
use crate::model::machine::Vitals;
use crate::model::ranges::SensorKind;

/// Maximum number of readings retained per machine.
const MAX_HISTORY_SIZE: usize = 60;

/// The prediction service computes rolling-window features and rejects
/// requests with fewer records than this.
const MIN_PREDICTION_WINDOW: usize = 3;

/// Bounded per-machine rings of recent sensor readings.
///
/// Fed from each applied fetch cycle; drives the sparkline trends in the
/// vitals view and supplies ordered windows for ML prediction requests.
#[derive(Debug, Clone, Default)]
pub struct VitalsHistory {
    series: HashMap<String, MachineSeries>,
}

#[derive(Debug, Clone, Default)]
struct MachineSeries {
    temperature: VecDeque<f64>,
    pressure: VecDeque<f64>,
    vibration: VecDeque<f64>,
    timestamps: VecDeque<String>,
}

impl MachineSeries {
    fn push(&mut self, vitals: &Vitals) {
        let timestamp =
            vitals.timestamp.clone().unwrap_or_else(|| Utc::now().to_rfc3339());
        self.temperature.push_back(vitals.temperature);
        self.pressure.push_back(vitals.pressure);
        self.vibration.push_back(vitals.vibration);
        self.timestamps.push_back(timestamp);
        while self.timestamps.len() > MAX_HISTORY_SIZE {
            self.temperature.pop_front();
            self.pressure.pop_front();
            self.vibration.pop_front();
            self.timestamps.pop_front();
        }
    }

    fn values(&self, kind: SensorKind) -> &VecDeque<f64> {
        match kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Pressure => &self.pressure,
            SensorKind::Vibration => &self.vibration,
        }
    }

    fn len(&self) -> usize {
        self.timestamps.len()
    }
}

impl VitalsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reading for a machine.
    pub fn record(&mut self, machine_id: &str, vitals: &Vitals) {
        self.series.entry(machine_id.to_string()).or_default().push(vitals);
    }

    /// Number of stored readings for a machine.
    pub fn len(&self, machine_id: &str) -> usize {
        self.series.get(machine_id).map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, machine_id: &str) -> bool {
        self.len(machine_id) == 0
    }

    /// Sparkline data for one sensor channel, normalized to 0-7 for 8 bar
    /// levels. Empty when there are fewer than two readings.
    pub fn sparkline(&self, machine_id: &str, kind: SensorKind) -> Vec<u8> {
        let Some(series) = self.series.get(machine_id) else {
            return Vec::new();
        };
        normalize_sparkline(series.values(kind))
    }

    /// Latest stored reading for one sensor channel.
    pub fn latest(&self, machine_id: &str, kind: SensorKind) -> Option<f64> {
        self.series.get(machine_id).and_then(|s| s.values(kind).back().copied())
    }

    /// Build an ordered (oldest to newest) prediction request window for a
    /// machine.
    ///
    /// Uses the stored readings when at least [`MIN_PREDICTION_WINDOW`] are
    /// available; otherwise synthesizes a minimal window around the current
    /// vitals with back-dated timestamps, the way the original client seeds
    /// the rolling features before any history has accumulated.
    pub fn prediction_window(&self, machine_id: &str, current: &Vitals) -> Vec<PredictionRecord> {
        if let Some(series) = self.series.get(machine_id) {
            if series.len() >= MIN_PREDICTION_WINDOW {
                return series
                    .timestamps
                    .iter()
                    .zip(series.temperature.iter())
                    .zip(series.pressure.iter())
                    .zip(series.vibration.iter())
                    .map(|(((timestamp, &temperature), &pressure), &vibration)| PredictionRecord {
                        timestamp: timestamp.clone(),
                        temperature,
                        vibration,
                        pressure,
                    })
                    .collect();
            }
        }

        let now = Utc::now();
        (0..MIN_PREDICTION_WINDOW as i64)
            .map(|i| {
                let offset = MIN_PREDICTION_WINDOW as i64 - 1 - i;
                PredictionRecord {
                    timestamp: (now - ChronoDuration::hours(offset)).to_rfc3339(),
                    temperature: current.temperature,
                    vibration: current.vibration,
                    pressure: current.pressure,
                }
            })
            .collect()
    }
}

/// Normalize values to the 0-7 range for sparkline display.
fn normalize_sparkline(values: &VecDeque<f64>) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(f64::EPSILON);

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals(temperature: f64) -> Vitals {
        Vitals {
            temperature,
            pressure: 100.0,
            vibration: 1.0,
            timestamp: Some("2024-08-01T10:00:00".to_string()),
        }
    }

    #[test]
    fn test_record_is_bounded() {
        let mut history = VitalsHistory::new();
        for i in 0..(MAX_HISTORY_SIZE + 10) {
            history.record("1", &vitals(i as f64));
        }
        assert_eq!(history.len("1"), MAX_HISTORY_SIZE);
        // Oldest entries were evicted.
        assert_eq!(history.latest("1", SensorKind::Temperature), Some(69.0));
    }

    #[test]
    fn test_sparkline_normalization() {
        let mut history = VitalsHistory::new();
        history.record("1", &vitals(0.0));
        history.record("1", &vitals(50.0));
        history.record("1", &vitals(100.0));

        let spark = history.sparkline("1", SensorKind::Temperature);
        assert_eq!(spark, vec![0, 3, 7]);
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        let mut history = VitalsHistory::new();
        assert!(history.sparkline("1", SensorKind::Temperature).is_empty());
        history.record("1", &vitals(42.0));
        assert!(history.sparkline("1", SensorKind::Temperature).is_empty());
    }

    #[test]
    fn test_flat_series_stays_at_floor() {
        let mut history = VitalsHistory::new();
        history.record("1", &vitals(42.0));
        history.record("1", &vitals(42.0));
        assert_eq!(history.sparkline("1", SensorKind::Temperature), vec![0, 0]);
    }

    #[test]
    fn test_prediction_window_synthesized_when_short() {
        let mut history = VitalsHistory::new();
        history.record("1", &vitals(60.0));

        let window = history.prediction_window("1", &vitals(60.0));
        assert_eq!(window.len(), 3);
        // Ordered oldest to newest.
        assert!(window[0].timestamp <= window[1].timestamp);
        assert!(window[1].timestamp <= window[2].timestamp);
        assert!(window.iter().all(|r| (r.temperature - 60.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_prediction_window_uses_stored_history() {
        let mut history = VitalsHistory::new();
        for t in [61.0, 62.0, 63.0, 64.0] {
            history.record("1", &vitals(t));
        }

        let window = history.prediction_window("1", &vitals(99.0));
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].temperature, 61.0);
        assert_eq!(window[3].temperature, 64.0);
    }
}
