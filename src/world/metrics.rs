//! Per-shift counters and timeline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::{Action, ActionOutcome, State};

/// Snapshot of the fleet taken at each trip-generation boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricsSample {
    pub time: f64,
    pub trips: usize,
    pub lost_trips: usize,
    /// Mean battery over scooters parked in clusters.
    pub mean_battery: f64,
    pub deviation_from_ideal_state: usize,
    pub battery_deficiency: f64,
}

/// Counters accumulated over a shift.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShiftMetrics {
    pub trips: usize,
    pub lost_trips: usize,
    pub deliveries: usize,
    pub pick_ups: usize,
    pub battery_swaps: usize,
    pub batteries_refilled: usize,
    pub vehicle_arrivals: usize,
    /// Kilometres driven by all vehicles.
    pub vehicle_distance: f64,
    /// `flows[from][to]` counts completed trips between clusters.
    pub flows: Vec<Vec<usize>>,
    pub timeline: Vec<MetricsSample>,
}

impl ShiftMetrics {
    pub fn new(number_of_clusters: usize) -> Self {
        Self {
            flows: vec![vec![0; number_of_clusters]; number_of_clusters],
            ..Self::default()
        }
    }

    pub fn record_flow(&mut self, departure_cluster_id: usize, arrival_cluster_id: usize) {
        if let Some(cell) = self
            .flows
            .get_mut(departure_cluster_id)
            .and_then(|row| row.get_mut(arrival_cluster_id))
        {
            *cell += 1;
        }
    }

    pub fn record_action(&mut self, action: &Action, distance: f64, outcome: &ActionOutcome) {
        self.vehicle_arrivals += 1;
        self.battery_swaps += action.battery_swaps.len();
        self.pick_ups += action.pick_ups.len();
        self.deliveries += action.delivery_scooters.len();
        self.batteries_refilled += outcome.batteries_refilled;
        self.vehicle_distance += distance;
    }

    pub fn record_sample(&mut self, time: f64, state: &State) {
        let (sum, count) = state
            .clusters()
            .flat_map(|c| c.scooters.iter())
            .fold((0.0, 0usize), |(s, n), scooter| (s + scooter.battery, n + 1));
        self.timeline.push(MetricsSample {
            time,
            trips: self.trips,
            lost_trips: self.lost_trips,
            mean_battery: if count == 0 { 0.0 } else { sum / count as f64 },
            deviation_from_ideal_state: state.total_deviation_from_ideal_state(),
            battery_deficiency: state.clusters().map(|c| c.battery_deficiency()).sum(),
        });
    }

    /// Trips that found no usable scooter, over all requested trips.
    pub fn lost_trip_ratio(&self) -> f64 {
        let requested = self.trips + self.lost_trips;
        if requested == 0 {
            0.0
        } else {
            self.lost_trips as f64 / requested as f64
        }
    }

    pub fn completed_trips(&self) -> usize {
        self.flows.iter().flatten().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::test_support::small_state;

    #[test]
    fn flows_ignore_unknown_clusters() {
        let mut m = ShiftMetrics::new(2);
        m.record_flow(0, 1);
        m.record_flow(0, 1);
        m.record_flow(5, 0);
        assert_eq!(m.flows, vec![vec![0, 2], vec![0, 0]]);
        assert_eq!(m.completed_trips(), 2);
    }

    #[test]
    fn lost_trip_ratio() {
        let mut m = ShiftMetrics::new(1);
        assert_eq!(m.lost_trip_ratio(), 0.0);
        m.trips = 3;
        m.lost_trips = 1;
        assert!((m.lost_trip_ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn action_counters() {
        let mut m = ShiftMetrics::new(1);
        let action = Action::new(vec![1, 2], vec![3], vec![], 0);
        let outcome = ActionOutcome::default();
        m.record_action(&action, 1.5, &outcome);
        assert_eq!(m.battery_swaps, 2);
        assert_eq!(m.pick_ups, 1);
        assert_eq!(m.vehicle_arrivals, 1);
        assert!((m.vehicle_distance - 1.5).abs() < 1e-12);
    }

    #[test]
    fn sample_reads_the_state() {
        let config = SimulationConfig::default();
        let state = small_state(&config);
        let mut m = ShiftMetrics::new(state.number_of_clusters());
        m.lost_trips = 2;
        m.record_sample(20.0, &state);

        let s = m.timeline[0];
        assert_eq!(s.time, 20.0);
        assert_eq!(s.lost_trips, 2);
        // cluster 1 has four scooters too many, cluster 2 three too few
        assert_eq!(s.deviation_from_ideal_state, 7);
        let expected_mean = (5.0 * 80.0 + 465.0 + 60.0) / 14.0;
        assert!((s.mean_battery - expected_mean).abs() < 1e-9);
    }
}
