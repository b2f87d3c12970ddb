// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # vitalwatch
//!
//! A diagnostic TUI and library for monitoring mining-equipment vitals and
//! machine-failure-risk predictions.
//!
//! This crate polls a remote HTTP backend for machine state (temperature,
//! pressure, vibration, failure predictions), reconciles live data against a
//! fixed fallback fleet when the backend is unreachable or empty, and
//! displays everything in an interactive terminal UI with operator controls
//! for the backend's sensor simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ telemetry │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(view-model)    │(rendering)   │         │ │
//! │  └────┬────┘    └─────┬─────┘    └─────────┘    └─────────┘ │
//! │       │               │                                      │
//! │       ▼               ▼                                      │
//! │  ┌─────────┐    ┌───────────┐                                │
//! │  │  model  │    │    api    │◀── HttpApiClient (reqwest)    │
//! │  │ (domain)│    │(transport)│                                │
//! │  └─────────┘    └───────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`telemetry`]**: The view-model — sequence-numbered fetch cycles,
//!   all-or-nothing live/fallback reconciliation, a recurring poll timer,
//!   and operator command dispatch
//! - **[`api`]**: The HTTP/JSON boundary — an [`ApiClient`] trait over the
//!   transport with a reqwest implementation and a four-way error taxonomy
//! - **[`model`]**: Machine records, risk bucketing, sensor-range
//!   classification, the fallback fleet, and vitals history
//! - **[`app`]**: Application state, view navigation, and user interaction
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Behavior guarantees
//!
//! Every fetch cycle ends with either live data or the fallback set
//! displayed, never a blank dashboard; the loading indicator clears on every
//! exit path; snapshot sets are replaced atomically; and a stale cycle
//! resolving after a newer one is discarded.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Point the dashboard at a backend
//! vitalwatch --url http://localhost:5000
//!
//! # Export the current fleet state and exit
//! vitalwatch --export fleet.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use vitalwatch::{fallback_machines, App, HttpApiClient, Telemetry};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let client = Arc::new(HttpApiClient::new("http://localhost:5000").unwrap());
//! let telemetry = Telemetry::new(rt.handle().clone(), client, fallback_machines());
//! let app = App::new(telemetry);
//! ```
//!
//! ### Pure classification helpers
//!
//! ```
//! use vitalwatch::model::{RiskBucket, SensorKind, SensorRanges, SensorStatus};
//!
//! let ranges = SensorRanges::default();
//! assert_eq!(ranges.classify(SensorKind::Temperature, 90.0), SensorStatus::Caution);
//! assert_eq!(RiskBucket::from_level(80).label(), "Critical");
//! ```

pub mod api;
pub mod app;
pub mod events;
pub mod model;
pub mod settings;
pub mod telemetry;
pub mod ui;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, HttpApiClient};
pub use app::{App, View};
pub use model::{fallback_machines, FleetData, Machine, MachineStatus, MachineType};
pub use settings::Settings;
pub use telemetry::{Command, Notice, NoticeKind, Telemetry};
