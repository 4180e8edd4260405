//! Seeded synthetic scenarios.
//!
//! Produces a consistent [`State`] with random clusters inside the configured
//! geographic bound, a main depot in the middle, optional small depots and
//! vehicles parked at the main depot. Stands in for real ingestion data in
//! tests, demos and policy evaluation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::entities::{Cluster, Depot, GeoPoint, Scooter, Vehicle};
use crate::state::{State, StateError};

/// Degrees of latitude/longitude scooters may lie away from their cluster center.
const CLUSTER_SPREAD: f64 = 0.002;

/// Builder for synthetic scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBuilder {
    number_of_clusters: usize,
    scooters_per_cluster: (usize, usize),
    ideal_state: (usize, usize),
    battery: (f64, f64),
    trip_intensity: (f64, f64),
    number_of_small_depots: usize,
    number_of_vehicles: usize,
    seed: u64,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self {
            number_of_clusters: 10,
            scooters_per_cluster: (2, 12),
            ideal_state: (4, 8),
            battery: (10.0, 100.0),
            trip_intensity: (0.5, 3.0),
            number_of_small_depots: 1,
            number_of_vehicles: 2,
            seed: 0,
        }
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clusters(mut self, n: usize) -> Self {
        self.number_of_clusters = n;
        self
    }

    /// Scooters per cluster, drawn uniformly from `min..=max`.
    pub fn scooters_per_cluster(mut self, min: usize, max: usize) -> Self {
        self.scooters_per_cluster = ordered(min, max);
        self
    }

    /// Ideal scooter count per cluster, drawn uniformly from `min..=max`.
    pub fn ideal_state(mut self, min: usize, max: usize) -> Self {
        self.ideal_state = ordered(min, max);
        self
    }

    /// Initial battery levels, drawn uniformly from `min..=max` and clamped to `[0, 100]`.
    pub fn battery(mut self, min: f64, max: f64) -> Self {
        let (lo, hi) = ordered(min.clamp(0.0, 100.0), max.clamp(0.0, 100.0));
        self.battery = (lo, hi);
        self
    }

    /// Trips per iteration per cluster, drawn uniformly from `min..=max`.
    pub fn trip_intensity(mut self, min: f64, max: f64) -> Self {
        self.trip_intensity = ordered(min.max(0.0), max.max(0.0));
        self
    }

    pub fn small_depots(mut self, n: usize) -> Self {
        self.number_of_small_depots = n;
        self
    }

    pub fn vehicles(mut self, n: usize) -> Self {
        self.number_of_vehicles = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generates the state. The same builder always yields the same state.
    pub fn build(&self, config: &SimulationConfig) -> Result<State, StateError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let bound = config.geo_bound;
        let n = self.number_of_clusters;

        let mut clusters = Vec::with_capacity(n);
        let mut next_scooter_id = 0;
        for id in 0..n {
            let center = GeoPoint::new(
                rng.gen_range(bound.lat_min..=bound.lat_max),
                rng.gen_range(bound.lon_min..=bound.lon_max),
            );

            let count = rng.gen_range(self.scooters_per_cluster.0..=self.scooters_per_cluster.1);
            let mut scooters = Vec::with_capacity(count);
            for _ in 0..count {
                let position = GeoPoint::new(
                    center.lat + rng.gen_range(-CLUSTER_SPREAD..=CLUSTER_SPREAD),
                    center.lon + rng.gen_range(-CLUSTER_SPREAD..=CLUSTER_SPREAD),
                )
                .clamped(&bound);
                let battery = rng.gen_range(self.battery.0..=self.battery.1);
                scooters.push(Scooter::new(next_scooter_id, position, battery)?);
                next_scooter_id += 1;
            }

            let mut weights: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..=1.0)).collect();
            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                weights.iter_mut().for_each(|w| *w /= total);
            }

            clusters.push(
                Cluster::new(id, scooters, center)
                    .with_ideal_state(rng.gen_range(self.ideal_state.0..=self.ideal_state.1))
                    .with_trip_intensity(
                        rng.gen_range(self.trip_intensity.0..=self.trip_intensity.1),
                    )
                    .with_move_probabilities(weights),
            );
        }

        let main = GeoPoint::new(
            (bound.lat_min + bound.lat_max) / 2.0,
            (bound.lon_min + bound.lon_max) / 2.0,
        );
        let mut depots = vec![Depot::main(n, main, config.main_depot_capacity)];
        for k in 0..self.number_of_small_depots {
            let position = GeoPoint::new(
                rng.gen_range(bound.lat_min..=bound.lat_max),
                rng.gen_range(bound.lon_min..=bound.lon_max),
            );
            depots.push(Depot::small(
                n + 1 + k,
                position,
                config.small_depot_capacity,
                config.charge_time_per_battery,
            ));
        }

        let vehicles = (0..self.number_of_vehicles)
            .map(|id| {
                Vehicle::new(
                    id,
                    n,
                    config.vehicle_battery_capacity,
                    config.vehicle_scooter_capacity,
                )
            })
            .collect();

        State::new(clusters, depots, vehicles)
    }
}
