//! Geographic clusters of scooters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::EntityError;
use super::location::{GeoPoint, Location};
use super::scooter::{Scooter, FULL_BATTERY};

/// A group of scooters sharing a demand profile.
///
/// The cluster keeps its id and center for the whole run while scooters
/// come and go.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    pub id: usize,
    pub center: GeoPoint,
    pub scooters: Vec<Scooter>,
    /// Target number of scooters.
    pub ideal_state: usize,
    /// Poisson rate of trips started here per iteration.
    pub trip_intensity_per_iteration: f64,
    /// Row of destination probabilities indexed by cluster id, own id = stay.
    pub move_probabilities: Option<Vec<f64>>,
}

impl Cluster {
    /// Creates a cluster centred on the centroid of its scooters.
    ///
    /// `fallback_center` is used when the cluster starts out empty.
    pub fn new(id: usize, scooters: Vec<Scooter>, fallback_center: GeoPoint) -> Self {
        let center = GeoPoint::centroid(scooters.iter().filter_map(|s| s.position.as_ref()))
            .unwrap_or(fallback_center);
        Self {
            id,
            center,
            scooters,
            ideal_state: 0,
            trip_intensity_per_iteration: 0.0,
            move_probabilities: None,
        }
    }

    pub fn with_ideal_state(mut self, ideal_state: usize) -> Self {
        self.ideal_state = ideal_state;
        self
    }

    pub fn with_trip_intensity(mut self, intensity: f64) -> Self {
        self.trip_intensity_per_iteration = intensity;
        self
    }

    pub fn with_move_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.move_probabilities = Some(probabilities);
        self
    }

    pub fn number_of_scooters(&self) -> usize {
        self.scooters.len()
    }

    pub fn contains(&self, scooter_id: usize) -> bool {
        self.scooters.iter().any(|s| s.id == scooter_id)
    }

    pub fn get_scooter(&self, scooter_id: usize) -> Option<&Scooter> {
        self.scooters.iter().find(|s| s.id == scooter_id)
    }

    pub(crate) fn get_scooter_mut(&mut self, scooter_id: usize) -> Result<&mut Scooter, EntityError> {
        let cluster_id = self.id;
        self.scooters
            .iter_mut()
            .find(|s| s.id == scooter_id)
            .ok_or(EntityError::ScooterNotInCluster {
                cluster_id,
                scooter_id,
            })
    }

    /// Adds a scooter, placing it at the cluster center.
    pub fn add_scooter(&mut self, mut scooter: Scooter) -> Result<(), EntityError> {
        if self.contains(scooter.id) {
            return Err(EntityError::DuplicateScooter {
                cluster_id: self.id,
                scooter_id: scooter.id,
            });
        }
        scooter.set_position(self.center);
        self.scooters.push(scooter);
        Ok(())
    }

    /// Removes and returns a scooter, preserving the order of the others.
    pub fn remove_scooter(&mut self, scooter_id: usize) -> Result<Scooter, EntityError> {
        let idx = self
            .scooters
            .iter()
            .position(|s| s.id == scooter_id)
            .ok_or(EntityError::ScooterNotInCluster {
                cluster_id: self.id,
                scooter_id,
            })?;
        Ok(self.scooters.remove(idx))
    }

    /// Scooters that can be rented, in membership order.
    pub fn get_available_scooters(&self, battery_limit: f64) -> Vec<&Scooter> {
        self.scooters
            .iter()
            .filter(|s| s.is_available(battery_limit))
            .collect()
    }

    /// Scooters below full battery, lowest battery first.
    pub fn get_swappable_scooters(&self) -> Vec<&Scooter> {
        let mut swappable: Vec<&Scooter> = self
            .scooters
            .iter()
            .filter(|s| s.battery < FULL_BATTERY)
            .collect();
        swappable.sort_by(|a, b| a.battery.total_cmp(&b.battery));
        swappable
    }

    /// Every scooter, lowest battery first.
    pub fn scooters_by_battery(&self) -> Vec<&Scooter> {
        let mut all: Vec<&Scooter> = self.scooters.iter().collect();
        all.sort_by(|a, b| a.battery.total_cmp(&b.battery));
        all
    }

    /// Destination distribution for a trip leaving this cluster.
    ///
    /// The stay entry is dropped and the rest renormalised. If no probability
    /// mass is left, every other cluster is equally likely.
    pub fn get_leave_distribution(&self) -> Result<Vec<f64>, EntityError> {
        let row = self
            .move_probabilities
            .as_ref()
            .ok_or(EntityError::MoveProbabilitiesUnset {
                cluster_id: self.id,
            })?;
        if self.id >= row.len() {
            return Err(EntityError::MoveProbabilitiesLength {
                cluster_id: self.id,
                expected: self.id + 1,
                found: row.len(),
            });
        }

        let mut leave: Vec<f64> = row
            .iter()
            .enumerate()
            .map(|(j, &p)| if j == self.id { 0.0 } else { p.max(0.0) })
            .collect();
        let total: f64 = leave.iter().sum();

        if total > 0.0 {
            leave.iter_mut().for_each(|p| *p /= total);
        } else if leave.len() > 1 {
            warn!(cluster = self.id, "no leave probability mass, using uniform destinations");
            let uniform = 1.0 / (leave.len() - 1) as f64;
            for (j, p) in leave.iter_mut().enumerate() {
                *p = if j == self.id { 0.0 } else { uniform };
            }
        }
        Ok(leave)
    }

    /// Probability that a given rentable scooter here is used during one iteration.
    pub fn prob_of_scooter_usage(&self, battery_limit: f64) -> f64 {
        let available = self.get_available_scooters(battery_limit).len().max(1);
        (self.trip_intensity_per_iteration / available as f64).min(1.0)
    }

    /// Sum of battery deficiencies, in full-battery equivalents.
    pub fn battery_deficiency(&self) -> f64 {
        self.scooters.iter().map(|s| s.deficiency()).sum()
    }

    /// Absolute difference between current and ideal scooter count.
    pub fn deviation_from_ideal_state(&self) -> usize {
        self.scooters.len().abs_diff(self.ideal_state)
    }

    /// Scooters above the ideal state.
    pub fn excess(&self) -> usize {
        self.scooters.len().saturating_sub(self.ideal_state)
    }

    /// Scooters missing to reach the ideal state.
    pub fn deficit(&self) -> usize {
        self.ideal_state.saturating_sub(self.scooters.len())
    }

    pub fn mean_battery(&self) -> Option<f64> {
        if self.scooters.is_empty() {
            None
        } else {
            Some(self.scooters.iter().map(|s| s.battery).sum::<f64>() / self.scooters.len() as f64)
        }
    }
}

impl Location for Cluster {
    fn id(&self) -> usize {
        self.id
    }

    fn position(&self) -> GeoPoint {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with(batteries: &[f64]) -> Cluster {
        let scooters = batteries
            .iter()
            .enumerate()
            .map(|(i, &b)| Scooter::new(i, GeoPoint::new(59.91, 10.75), b).unwrap())
            .collect();
        Cluster::new(0, scooters, GeoPoint::new(59.91, 10.75))
    }

    #[test]
    fn center_is_centroid_of_members() {
        let scooters = vec![
            Scooter::new(0, GeoPoint::new(59.90, 10.70), 50.0).unwrap(),
            Scooter::new(1, GeoPoint::new(59.92, 10.80), 50.0).unwrap(),
        ];
        let c = Cluster::new(3, scooters, GeoPoint::new(0.0, 0.0));
        assert!((c.center.lat - 59.91).abs() < 1e-9);
        assert!((c.center.lon - 10.75).abs() < 1e-9);
    }

    #[test]
    fn empty_cluster_uses_fallback_center() {
        let c = Cluster::new(0, vec![], GeoPoint::new(1.0, 2.0));
        assert_eq!(c.center, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn available_scooters_respect_limit() {
        let c = cluster_with(&[10.0, 20.0, 90.0]);
        let ids: Vec<usize> = c.get_available_scooters(20.0).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn swappable_scooters_sorted_lowest_first() {
        let c = cluster_with(&[60.0, 100.0, 5.0, 30.0]);
        let ids: Vec<usize> = c.get_swappable_scooters().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 0]);
    }

    #[test]
    fn add_duplicate_scooter_fails() {
        let mut c = cluster_with(&[50.0]);
        let dup = Scooter::new(0, GeoPoint::new(59.91, 10.75), 40.0).unwrap();
        assert_eq!(
            c.add_scooter(dup),
            Err(EntityError::DuplicateScooter {
                cluster_id: 0,
                scooter_id: 0
            })
        );
    }

    #[test]
    fn remove_missing_scooter_fails() {
        let mut c = cluster_with(&[50.0]);
        assert_eq!(
            c.remove_scooter(9),
            Err(EntityError::ScooterNotInCluster {
                cluster_id: 0,
                scooter_id: 9
            })
        );
    }

    #[test]
    fn added_scooter_sits_at_center() {
        let mut c = cluster_with(&[50.0]);
        let mut s = Scooter::new(5, GeoPoint::new(59.0, 10.0), 70.0).unwrap();
        s.clear_position();
        c.add_scooter(s).unwrap();
        assert_eq!(c.get_scooter(5).and_then(|s| s.position), Some(c.center));
    }

    #[test]
    fn leave_distribution_drops_stay() {
        let c = cluster_with(&[]).with_move_probabilities(vec![0.5, 0.25, 0.25]);
        let leave = c.get_leave_distribution().unwrap();
        assert_eq!(leave, vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn leave_distribution_falls_back_to_uniform() {
        let c = cluster_with(&[]).with_move_probabilities(vec![1.0, 0.0, 0.0, 0.0]);
        let leave = c.get_leave_distribution().unwrap();
        for p in &leave[1..] {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
        assert_eq!(leave[0], 0.0);
    }

    #[test]
    fn leave_distribution_requires_probabilities() {
        let c = cluster_with(&[]);
        assert_eq!(
            c.get_leave_distribution(),
            Err(EntityError::MoveProbabilitiesUnset { cluster_id: 0 })
        );
    }

    #[test]
    fn usage_probability_is_capped() {
        let c = cluster_with(&[80.0, 80.0]).with_trip_intensity(5.0);
        assert_eq!(c.prob_of_scooter_usage(20.0), 1.0);
        let c = cluster_with(&[80.0, 80.0, 80.0, 80.0]).with_trip_intensity(1.0);
        assert!((c.prob_of_scooter_usage(20.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn excess_and_deficit() {
        let c = cluster_with(&[50.0, 50.0, 50.0]).with_ideal_state(1);
        assert_eq!(c.excess(), 2);
        assert_eq!(c.deficit(), 0);
        assert_eq!(c.deviation_from_ideal_state(), 2);
        let c = c.with_ideal_state(5);
        assert_eq!(c.deficit(), 2);
    }

    #[test]
    fn battery_deficiency_sums_members() {
        let c = cluster_with(&[50.0, 75.0]);
        assert!((c.battery_deficiency() - 0.75).abs() < 1e-12);
    }
}
