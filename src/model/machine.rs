//! Machine data models and fleet-level processing.
//!
//! These types match the JSON served by the backend's machine endpoints and
//! carry the derived fields the dashboard renders (risk buckets, fleet
//! statistics, provenance).

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The four monitored machine classes.
///
/// Each class has a closed set of failure categories the prediction service
/// can report (see [`MachineType::common_failures`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineType {
    #[serde(rename = "Haul Truck")]
    HaulTruck,
    #[serde(rename = "Drill Rig")]
    DrillRig,
    #[serde(rename = "Shovel/Excavator")]
    ShovelExcavator,
    #[serde(rename = "Crusher")]
    Crusher,
}

impl MachineType {
    /// Display label matching the wire representation.
    pub fn label(&self) -> &'static str {
        match self {
            MachineType::HaulTruck => "Haul Truck",
            MachineType::DrillRig => "Drill Rig",
            MachineType::ShovelExcavator => "Shovel/Excavator",
            MachineType::Crusher => "Crusher",
        }
    }

    /// The closed set of failure categories for this machine class.
    pub fn common_failures(&self) -> &'static [&'static str] {
        match self {
            MachineType::HaulTruck => {
                &["engine_breakdown", "hydraulic_leak", "tire_wear", "transmission_fault"]
            }
            MachineType::DrillRig => &["drill_bit_wear", "hydraulic_system_failure", "motor_fault"],
            MachineType::ShovelExcavator => {
                &["hydraulic_pump_failure", "bucket_arm_wear", "electrical_issue"]
            }
            MachineType::Crusher => {
                &["bearing_failure", "liner_wear", "motor_overheating", "conveyor_jam"]
            }
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operational state of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Online,
    Offline,
    Maintenance,
}

impl MachineStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MachineStatus::Online => "online",
            MachineStatus::Offline => "offline",
            MachineStatus::Maintenance => "maintenance",
        }
    }

    /// The state an offline/online toggle should move this machine into.
    pub fn toggled(&self) -> MachineStatus {
        match self {
            MachineStatus::Online => MachineStatus::Offline,
            MachineStatus::Offline | MachineStatus::Maintenance => MachineStatus::Online,
        }
    }
}

/// Health assessment derived by the backend from current vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Excellent,
    #[default]
    Good,
    Warning,
    Critical,
}

impl HealthState {
    /// Short symbol for table display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthState::Excellent => "EXC",
            HealthState::Good => "GOOD",
            HealthState::Warning => "WARN",
            HealthState::Critical => "CRIT",
        }
    }
}

/// Maintenance urgency reported alongside a failure prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Risk bucket derived from a 0-100 risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBucket {
    /// Bucket a 0-100 risk level. Boundaries are inclusive at the lower end
    /// of each bracket: >=80 Critical, >=60 High, >=40 Medium, else Low.
    pub fn from_level(level: u8) -> Self {
        if level >= 80 {
            RiskBucket::Critical
        } else if level >= 60 {
            RiskBucket::High
        } else if level >= 40 {
            RiskBucket::Medium
        } else {
            RiskBucket::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low",
            RiskBucket::Medium => "Medium",
            RiskBucket::High => "High",
            RiskBucket::Critical => "Critical",
        }
    }
}

/// One point-in-time set of sensor readings for a machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitals {
    pub temperature: f64,
    pub pressure: f64,
    pub vibration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Failure-risk prediction attached to a machine record.
///
/// The detail endpoint omits `risk_level`, so every numeric field defaults
/// to zero when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePrediction {
    #[serde(default)]
    pub risk_level: u8,
    pub predicted_failure_type: String,
    #[serde(default)]
    pub failure_description: String,
    pub estimated_time_to_failure: String,
    #[serde(default)]
    pub confidence: u8,
    #[serde(default)]
    pub maintenance_priority: Priority,
    #[serde(default)]
    pub recommended_action: String,
}

/// A maintenance log entry from the machine detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEntry {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
}

/// One monitored machine as served by the machine collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    pub status: MachineStatus,
    #[serde(default)]
    pub health_status: HealthState,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub vitals: Vitals,
    #[serde(default)]
    pub operating_hours: u64,
    #[serde(default)]
    pub efficiency: u32,
    #[serde(default)]
    pub last_maintenance: String,
    #[serde(default)]
    pub next_maintenance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_prediction: Option<FailurePrediction>,
    #[serde(default)]
    pub common_failures: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failure_descriptions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintenance_history: Vec<MaintenanceEntry>,
}

impl Machine {
    /// The predicted risk level, or zero when no prediction is attached.
    pub fn risk_level(&self) -> u8 {
        self.failure_prediction.as_ref().map(|p| p.risk_level).unwrap_or(0)
    }

    pub fn risk_bucket(&self) -> RiskBucket {
        RiskBucket::from_level(self.risk_level())
    }
}

/// The processed fleet snapshot the dashboard renders.
///
/// Rebuilt whole on every fetch cycle; the `live` flag applies uniformly to
/// the entire set (fallback substitution is all-or-nothing per cycle).
#[derive(Debug, Clone)]
pub struct FleetData {
    pub machines: Vec<Machine>,
    pub live: bool,
    pub last_updated: Instant,
}

impl FleetData {
    /// Build a snapshot set from a fetched (or fallback) machine collection.
    ///
    /// Machines are ordered worst-health first, then by name, so attention
    /// lands on trouble without scrolling.
    pub fn from_machines(mut machines: Vec<Machine>, live: bool) -> Self {
        machines
            .sort_by(|a, b| b.health_status.cmp(&a.health_status).then_with(|| a.name.cmp(&b.name)));
        Self {
            machines,
            live,
            last_updated: Instant::now(),
        }
    }

    pub fn total(&self) -> usize {
        self.machines.len()
    }

    pub fn online_count(&self) -> usize {
        self.machines.iter().filter(|m| m.status == MachineStatus::Online).count()
    }

    pub fn critical_count(&self) -> usize {
        self.machines.iter().filter(|m| m.health_status == HealthState::Critical).count()
    }

    /// Mean efficiency across the fleet, rounded; zero for an empty set.
    pub fn avg_efficiency(&self) -> u32 {
        if self.machines.is_empty() {
            return 0;
        }
        let sum: u32 = self.machines.iter().map(|m| m.efficiency).sum();
        (sum as f64 / self.machines.len() as f64).round() as u32
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bucket_boundaries() {
        assert_eq!(RiskBucket::from_level(39), RiskBucket::Low);
        assert_eq!(RiskBucket::from_level(40), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_level(59), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_level(60), RiskBucket::High);
        assert_eq!(RiskBucket::from_level(79), RiskBucket::High);
        assert_eq!(RiskBucket::from_level(80), RiskBucket::Critical);
        assert_eq!(RiskBucket::from_level(100), RiskBucket::Critical);
        assert_eq!(RiskBucket::from_level(0), RiskBucket::Low);
    }

    #[test]
    fn test_deserialize_machine() {
        let json = r#"{
            "id": "4",
            "name": "Crusher CR-004",
            "type": "Crusher",
            "status": "online",
            "health_status": "warning",
            "location": "Processing Plant D",
            "description": "Used to break down mined ore",
            "vitals": { "temperature": 75.2, "pressure": 130.0, "vibration": 2.3, "timestamp": "2024-08-01T10:00:00" },
            "operating_hours": 4000,
            "efficiency": 82,
            "last_maintenance": "2024-07-15",
            "next_maintenance": "2024-09-15",
            "failure_prediction": {
                "risk_level": 50,
                "predicted_failure_type": "liner_wear",
                "failure_description": "Crushing liner wear requiring replacement",
                "estimated_time_to_failure": "48 hours",
                "confidence": 70,
                "maintenance_priority": "high",
                "recommended_action": "Schedule maintenance in next 24 hours"
            },
            "common_failures": ["bearing_failure", "liner_wear", "motor_overheating", "conveyor_jam"]
        }"#;

        let machine: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(machine.machine_type, MachineType::Crusher);
        assert_eq!(machine.status, MachineStatus::Online);
        assert_eq!(machine.health_status, HealthState::Warning);
        assert_eq!(machine.risk_level(), 50);
        assert_eq!(machine.risk_bucket(), RiskBucket::Medium);
        let prediction = machine.failure_prediction.unwrap();
        assert_eq!(prediction.maintenance_priority, Priority::High);
    }

    #[test]
    fn test_deserialize_detail_without_risk_level() {
        // The detail endpoint omits risk_level and health_status.
        let json = r#"{
            "id": "1",
            "name": "Haul Truck HT-001",
            "type": "Haul Truck",
            "status": "online",
            "location": "Pit Area A",
            "vitals": { "temperature": 65.0, "pressure": 110.0, "vibration": 1.5 },
            "failure_prediction": {
                "predicted_failure_type": "tire_wear",
                "estimated_time_to_failure": "120 hours",
                "confidence": 80,
                "maintenance_priority": "medium",
                "recommended_action": "Monitor closely and schedule preventive maintenance"
            },
            "maintenance_history": [
                {"date": "2024-07-15", "type": "Routine", "duration": "4 hours"}
            ]
        }"#;

        let machine: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(machine.health_status, HealthState::Good);
        assert_eq!(machine.risk_level(), 0);
        assert_eq!(machine.maintenance_history.len(), 1);
    }

    #[test]
    fn test_fleet_data_sorts_worst_first() {
        let mut a = sample_machine("1", "Alpha");
        a.health_status = HealthState::Good;
        let mut b = sample_machine("2", "Bravo");
        b.health_status = HealthState::Critical;

        let fleet = FleetData::from_machines(vec![a, b], true);
        assert_eq!(fleet.machines[0].name, "Bravo");
        assert!(fleet.live);
    }

    #[test]
    fn test_fleet_stats() {
        let mut a = sample_machine("1", "Alpha");
        a.status = MachineStatus::Offline;
        a.efficiency = 80;
        let mut b = sample_machine("2", "Bravo");
        b.health_status = HealthState::Critical;
        b.efficiency = 91;

        let fleet = FleetData::from_machines(vec![a, b], false);
        assert_eq!(fleet.total(), 2);
        assert_eq!(fleet.online_count(), 1);
        assert_eq!(fleet.critical_count(), 1);
        assert_eq!(fleet.avg_efficiency(), 86);

        let empty = FleetData::from_machines(Vec::new(), false);
        assert_eq!(empty.avg_efficiency(), 0);
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(MachineStatus::Online.toggled(), MachineStatus::Offline);
        assert_eq!(MachineStatus::Offline.toggled(), MachineStatus::Online);
        assert_eq!(MachineStatus::Maintenance.toggled(), MachineStatus::Online);
    }

    fn sample_machine(id: &str, name: &str) -> Machine {
        Machine {
            id: id.to_string(),
            name: name.to_string(),
            machine_type: MachineType::HaulTruck,
            status: MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Pit Area A".to_string(),
            description: String::new(),
            vitals: Vitals {
                temperature: 65.0,
                pressure: 110.0,
                vibration: 1.5,
                timestamp: None,
            },
            operating_hours: 2500,
            efficiency: 88,
            last_maintenance: "2024-07-15".to_string(),
            next_maintenance: "2024-09-15".to_string(),
            failure_prediction: None,
            common_failures: Vec::new(),
            failure_descriptions: BTreeMap::new(),
            maintenance_history: Vec::new(),
        }
    }
}
