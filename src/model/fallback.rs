//! The fixed fallback fleet.
//!
//! Shown whenever the backend is unreachable, returns an error envelope, or
//! returns an empty collection. Substitution is all-or-nothing per fetch
//! cycle; these records are never mixed with live ones.

use std::collections::BTreeMap;

use crate::model::machine::{
    FailurePrediction, HealthState, Machine, MachineStatus, MachineType, Priority, Vitals,
};

/// Build the four-machine fallback dataset.
///
/// Values mirror a plausible healthy-ish fleet so the dashboard stays
/// readable while the backend is down.
pub fn fallback_machines() -> Vec<Machine> {
    vec![
        Machine {
            id: "1".to_string(),
            name: "Haul Truck HT-001".to_string(),
            machine_type: MachineType::HaulTruck,
            status: MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Pit Area A".to_string(),
            description: "Used for transporting ore and waste".to_string(),
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
            failure_prediction: Some(FailurePrediction {
                risk_level: 35,
                predicted_failure_type: "tire_wear".to_string(),
                failure_description: "Excessive tire wear requiring replacement".to_string(),
                estimated_time_to_failure: "120 hours".to_string(),
                confidence: 80,
                maintenance_priority: Priority::Medium,
                recommended_action: "Monitor closely and schedule preventive maintenance"
                    .to_string(),
            }),
            common_failures: string_vec(MachineType::HaulTruck.common_failures()),
            failure_descriptions: BTreeMap::new(),
            maintenance_history: Vec::new(),
        },
        Machine {
            id: "2".to_string(),
            name: "Drill Rig DR-002".to_string(),
            machine_type: MachineType::DrillRig,
            status: MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Blast Zone B".to_string(),
            description: "Essential for drilling blast holes".to_string(),
            vitals: Vitals {
                temperature: 70.0,
                pressure: 120.0,
                vibration: 2.0,
                timestamp: None,
            },
            operating_hours: 3200,
            efficiency: 85,
            last_maintenance: "2024-07-15".to_string(),
            next_maintenance: "2024-09-15".to_string(),
            failure_prediction: Some(FailurePrediction {
                risk_level: 40,
                predicted_failure_type: "drill_bit_wear".to_string(),
                failure_description: "Drill bit requires replacement due to wear".to_string(),
                estimated_time_to_failure: "96 hours".to_string(),
                confidence: 78,
                maintenance_priority: Priority::Medium,
                recommended_action: "Monitor closely and schedule preventive maintenance"
                    .to_string(),
            }),
            common_failures: string_vec(MachineType::DrillRig.common_failures()),
            failure_descriptions: BTreeMap::new(),
            maintenance_history: Vec::new(),
        },
        Machine {
            id: "3".to_string(),
            name: "Shovel EX-003".to_string(),
            machine_type: MachineType::ShovelExcavator,
            status: MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Loading Area C".to_string(),
            description: "Used for loading ore into haul trucks".to_string(),
            vitals: Vitals {
                temperature: 68.0,
                pressure: 105.0,
                vibration: 1.2,
                timestamp: None,
            },
            operating_hours: 2800,
            efficiency: 90,
            last_maintenance: "2024-07-15".to_string(),
            next_maintenance: "2024-09-15".to_string(),
            failure_prediction: Some(FailurePrediction {
                risk_level: 30,
                predicted_failure_type: "bucket_arm_wear".to_string(),
                failure_description: "Bucket or arm structural wear".to_string(),
                estimated_time_to_failure: "144 hours".to_string(),
                confidence: 75,
                maintenance_priority: Priority::Low,
                recommended_action: "Continue normal operations".to_string(),
            }),
            common_failures: string_vec(MachineType::ShovelExcavator.common_failures()),
            failure_descriptions: BTreeMap::new(),
            maintenance_history: Vec::new(),
        },
        Machine {
            id: "4".to_string(),
            name: "Crusher CR-004".to_string(),
            machine_type: MachineType::Crusher,
            status: MachineStatus::Online,
            health_status: HealthState::Good,
            location: "Processing Plant D".to_string(),
            description: "Used to break down mined ore".to_string(),
            vitals: Vitals {
                temperature: 75.0,
                pressure: 130.0,
                vibration: 2.3,
                timestamp: None,
            },
            operating_hours: 4000,
            efficiency: 82,
            last_maintenance: "2024-07-15".to_string(),
            next_maintenance: "2024-09-15".to_string(),
            failure_prediction: Some(FailurePrediction {
                risk_level: 50,
                predicted_failure_type: "liner_wear".to_string(),
                failure_description: "Crushing liner wear requiring replacement".to_string(),
                estimated_time_to_failure: "48 hours".to_string(),
                confidence: 70,
                maintenance_priority: Priority::High,
                recommended_action: "Schedule maintenance in next 24 hours".to_string(),
            }),
            common_failures: string_vec(MachineType::Crusher.common_failures()),
            failure_descriptions: BTreeMap::new(),
            maintenance_history: Vec::new(),
        },
    ]
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_set_shape() {
        let machines = fallback_machines();
        assert_eq!(machines.len(), 4);

        let ids: Vec<&str> = machines.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);

        for machine in &machines {
            assert_eq!(machine.status, MachineStatus::Online);
            assert!(machine.failure_prediction.is_some());
            assert!(!machine.common_failures.is_empty());
        }
    }

    #[test]
    fn test_fallback_failure_types_are_in_class_sets() {
        for machine in fallback_machines() {
            let predicted =
                machine.failure_prediction.as_ref().unwrap().predicted_failure_type.clone();
            assert!(machine.machine_type.common_failures().contains(&predicted.as_str()));
        }
    }
}
