//! Sensor range configuration and reading classification.
//!
//! Ranges are served by the backend (`GET /machine/vitals/ranges`) as three
//! sub-ranges per sensor plus a unit. Classification precedence matters for
//! alerting and must not be reordered: critical is checked first, then
//! caution, then normal; anything left over is critical (readings below the
//! normal floor included).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three monitored sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Pressure,
    Vibration,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] =
        [SensorKind::Temperature, SensorKind::Pressure, SensorKind::Vibration];

    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Pressure => "Pressure",
            SensorKind::Vibration => "Vibration",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of a single sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Normal,
    Caution,
    Critical,
}

impl SensorStatus {
    /// Short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            SensorStatus::Normal => "OK",
            SensorStatus::Caution => "WARN",
            SensorStatus::Critical => "CRIT",
        }
    }
}

/// An inclusive numeric sub-range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeBand {
    pub min: f64,
    pub max: f64,
}

impl RangeBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Operating ranges for one sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRange {
    pub normal: RangeBand,
    pub caution: RangeBand,
    pub critical: RangeBand,
    pub unit: String,
}

impl SensorRange {
    /// Classify a reading against this range.
    ///
    /// Precedence: critical floor wins outright, then caution membership,
    /// then normal membership; everything else (including below-normal
    /// values) is critical.
    pub fn classify(&self, value: f64) -> SensorStatus {
        if value >= self.critical.min {
            return SensorStatus::Critical;
        }
        if self.caution.contains(value) {
            return SensorStatus::Caution;
        }
        if self.normal.contains(value) {
            return SensorStatus::Normal;
        }
        SensorStatus::Critical
    }
}

/// Range configuration for all three sensors, as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRanges {
    pub temperature: SensorRange,
    pub pressure: SensorRange,
    pub vibration: SensorRange,
}

impl SensorRanges {
    pub fn get(&self, kind: SensorKind) -> &SensorRange {
        match kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Pressure => &self.pressure,
            SensorKind::Vibration => &self.vibration,
        }
    }

    /// Classify a reading for the given sensor channel.
    pub fn classify(&self, kind: SensorKind, value: f64) -> SensorStatus {
        self.get(kind).classify(value)
    }
}

impl Default for SensorRanges {
    /// The ranges the backend ships with, used until the ranges endpoint
    /// has been fetched successfully.
    fn default() -> Self {
        Self {
            temperature: SensorRange {
                normal: RangeBand { min: 20.0, max: 85.0 },
                caution: RangeBand { min: 85.1, max: 95.0 },
                critical: RangeBand { min: 95.1, max: 120.0 },
                unit: "°C".to_string(),
            },
            pressure: SensorRange {
                normal: RangeBand { min: 50.0, max: 150.0 },
                caution: RangeBand { min: 150.1, max: 180.0 },
                critical: RangeBand { min: 180.1, max: 220.0 },
                unit: "PSI".to_string(),
            },
            vibration: SensorRange {
                normal: RangeBand { min: 0.1, max: 2.0 },
                caution: RangeBand { min: 2.1, max: 4.0 },
                critical: RangeBand { min: 4.1, max: 8.0 },
                unit: "mm/s".to_string(),
            },
        }
    }
}
