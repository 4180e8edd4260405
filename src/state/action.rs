//! Vehicle actions.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::units::travel_minutes;

/// What a vehicle does at its current location before driving on.
///
/// Operations are executed pick-ups first, then battery swaps, then
/// deliveries, then the move to `next_location`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Action {
    /// Scooter ids whose battery is swapped in place.
    pub battery_swaps: Vec<usize>,
    /// Scooter ids loaded onto the vehicle.
    pub pick_ups: Vec<usize>,
    /// Scooter ids unloaded from the vehicle.
    pub delivery_scooters: Vec<usize>,
    /// Location id to drive to afterwards.
    pub next_location: usize,
}

impl Action {
    pub fn new(
        battery_swaps: Vec<usize>,
        pick_ups: Vec<usize>,
        delivery_scooters: Vec<usize>,
        next_location: usize,
    ) -> Self {
        Self {
            battery_swaps,
            pick_ups,
            delivery_scooters,
            next_location,
        }
    }

    /// An action that only drives to `next_location`.
    pub fn relocate(next_location: usize) -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), next_location)
    }

    pub fn number_of_operations(&self) -> usize {
        self.battery_swaps.len() + self.pick_ups.len() + self.delivery_scooters.len()
    }

    pub fn has_operations(&self) -> bool {
        self.number_of_operations() > 0
    }

    /// Batteries this action takes from the vehicle.
    pub fn batteries_used(&self) -> usize {
        self.battery_swaps.len() + self.pick_ups.len()
    }

    /// Minutes needed to perform the operations and drive `distance` kilometres.
    pub fn get_action_time(&self, distance: f64, config: &SimulationConfig) -> f64 {
        self.number_of_operations() as f64 * config.minutes_per_operation
            + config.minutes_constant_per_action
            + travel_minutes(distance, config.vehicle_speed_kmh)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<swaps: {}, pick-ups: {}, deliveries: {}, next: {}>",
            self.battery_swaps.len(),
            self.pick_ups.len(),
            self.delivery_scooters.len(),
            self.next_location
        )
    }
}

/// Result of executing an action on the state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionOutcome {
    /// Undiscounted reward.
    pub reward: f64,
    /// Minutes spent refilling batteries at a depot.
    pub wait_time: f64,
    pub batteries_refilled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocate_has_no_operations() {
        let a = Action::relocate(3);
        assert!(!a.has_operations());
        assert_eq!(a.next_location, 3);
    }

    #[test]
    fn action_time_counts_operations_and_travel() {
        let config = SimulationConfig::default();
        let a = Action::new(vec![1, 2], vec![3], vec![], 0);
        // 3 ops * 1.5 + 5 constant + 15 km at 30 km/h
        let t = a.get_action_time(15.0, &config);
        assert!((t - (4.5 + 5.0 + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn batteries_used_counts_swaps_and_pick_ups() {
        let a = Action::new(vec![1, 2], vec![3], vec![4, 5], 0);
        assert_eq!(a.batteries_used(), 3);
        assert_eq!(a.number_of_operations(), 5);
    }

    #[test]
    fn display_summarises_counts() {
        let a = Action::new(vec![1], vec![], vec![2, 3], 7);
        assert_eq!(a.to_string(), "<swaps: 1, pick-ups: 0, deliveries: 2, next: 7>");
    }
}
