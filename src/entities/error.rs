use thiserror::Error;

/// Invariant violations raised by the entity layer.
///
/// Every variant is fatal for the run that produced it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EntityError {
    #[error("Vehicle {vehicle_id} has no battery left in its inventory")]
    BatteryInventoryEmpty { vehicle_id: usize },

    #[error("Vehicle {vehicle_id} scooter inventory is full (capacity {capacity})")]
    ScooterInventoryFull { vehicle_id: usize, capacity: usize },

    #[error("Scooter {scooter_id} is not in the inventory of vehicle {vehicle_id}")]
    ScooterNotInInventory { vehicle_id: usize, scooter_id: usize },

    #[error("Scooter {scooter_id} is not in cluster {cluster_id}")]
    ScooterNotInCluster { cluster_id: usize, scooter_id: usize },

    #[error("Scooter {scooter_id} is already in cluster {cluster_id}")]
    DuplicateScooter { cluster_id: usize, scooter_id: usize },

    #[error("Depot {depot_id} cannot swap {requested} batteries, only {available} available")]
    DepotCapacityExceeded {
        depot_id: usize,
        requested: usize,
        available: f64,
    },

    #[error("Move probabilities of cluster {cluster_id} are not set")]
    MoveProbabilitiesUnset { cluster_id: usize },

    #[error("Move probabilities of cluster {cluster_id} have {found} entries, expected {expected}")]
    MoveProbabilitiesLength {
        cluster_id: usize,
        expected: usize,
        found: usize,
    },

    #[error("Battery level must lie in [0, 100], got {0}")]
    InvalidBattery(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_inventory_display() {
        let e = EntityError::BatteryInventoryEmpty { vehicle_id: 3 };
        assert_eq!(e.to_string(), "Vehicle 3 has no battery left in its inventory");
    }

    #[test]
    fn depot_capacity_display() {
        let e = EntityError::DepotCapacityExceeded {
            depot_id: 7,
            requested: 10,
            available: 4.5,
        };
        assert_eq!(
            e.to_string(),
            "Depot 7 cannot swap 10 batteries, only 4.5 available"
        );
    }

    #[test]
    fn unset_probabilities_name_the_cluster() {
        let e = EntityError::MoveProbabilitiesUnset { cluster_id: 2 };
        assert!(e.to_string().contains("cluster 2"));
    }
}
