//! Hand-made states shared by the unit tests.

use crate::config::SimulationConfig;
use crate::entities::{Cluster, Depot, GeoPoint, Scooter, Vehicle};
use crate::state::State;

/// Points one hundredth of a degree of latitude apart (about 1.1 km).
pub(crate) fn point(i: usize) -> GeoPoint {
    GeoPoint::new(59.91 + 0.01 * i as f64, 10.75)
}

/// A cluster at `point(id)` with scooters numbered from `first_scooter_id`.
pub(crate) fn cluster(id: usize, batteries: &[f64], first_scooter_id: usize) -> Cluster {
    let scooters = batteries
        .iter()
        .enumerate()
        .map(|(i, &b)| Scooter::new(first_scooter_id + i, point(id), b).unwrap())
        .collect();
    Cluster::new(id, scooters, point(id))
}

/// Three clusters on a north-south line, a main depot north of them and
/// one vehicle at cluster 0.
///
/// - cluster 0: five scooters at 80 %, ideal state 5 (balanced)
/// - cluster 1: eight scooters, ideal state 4 (excess)
/// - cluster 2: one scooter, ideal state 4 (deficit)
pub(crate) fn small_state(config: &SimulationConfig) -> State {
    let clusters = vec![
        cluster(0, &[80.0; 5], 0)
            .with_ideal_state(5)
            .with_trip_intensity(1.0)
            .with_move_probabilities(vec![0.2, 0.4, 0.4]),
        cluster(1, &[10.0, 15.0, 30.0, 50.0, 70.0, 90.0, 100.0, 100.0], 5)
            .with_ideal_state(4)
            .with_trip_intensity(2.0)
            .with_move_probabilities(vec![0.3, 0.4, 0.3]),
        cluster(2, &[60.0], 13)
            .with_ideal_state(4)
            .with_trip_intensity(0.5)
            .with_move_probabilities(vec![0.5, 0.5, 0.0]),
    ];
    let depots = vec![Depot::main(3, point(3), config.main_depot_capacity)];
    let vehicles = vec![Vehicle::new(
        0,
        0,
        config.vehicle_battery_capacity,
        config.vehicle_scooter_capacity,
    )];
    State::new(clusters, depots, vehicles).unwrap()
}
