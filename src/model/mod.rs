//! Data models and processing for the dashboard.
//!
//! This module holds the machine domain types, the derived fleet snapshot the
//! UI renders, sensor-range classification, the fixed fallback dataset, and
//! historical tracking.
//!
//! ## Submodules
//!
//! - [`machine`]: Machine records, risk bucketing, fleet statistics
//! - [`ranges`]: Sensor range configuration and reading classification
//! - [`fallback`]: The fixed 4-machine fallback fleet
//! - [`history`]: Bounded vitals rings for sparklines and prediction windows
//!
//! ## Data flow
//!
//! ```text
//! Vec<Machine> (wire JSON)
//!        │
//!        ▼
//! FleetData::from_machines(machines, live)
//!        │
//!        ├──▶ ordered, provenance-tagged snapshot set
//!        │
//!        └──▶ VitalsHistory::record() (for sparklines and ML windows)
//! ```

pub mod fallback;
pub mod history;
pub mod machine;
pub mod ranges;

pub use fallback::fallback_machines;
pub use history::VitalsHistory;
pub use machine::{
    FailurePrediction, FleetData, HealthState, Machine, MachineStatus, MachineType, Priority,
    RiskBucket, Vitals,
};
pub use ranges::{RangeBand, SensorKind, SensorRange, SensorRanges, SensorStatus};
