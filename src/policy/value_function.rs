//! Value-function interface and state feature encoding.
//!
//! The simulation treats a value function as an opaque scorer of states.
//! How it learns (linear, neural, tabular) is up to the implementation;
//! [`StateFeatures`] gives implementations a fixed-length encoding to work on.

use super::error::PolicyError;
use crate::state::State;

/// A scorer estimating the expected future reward from a state.
pub trait ValueFunction: Send + Sync {
    /// One-time initialisation, sized to the clusters and locations of `state`.
    fn setup(&mut self, state: &State);

    /// Estimated future reward of an encoded state.
    fn estimate_value_from_state_features(&self, features: &[f64]) -> Result<f64, PolicyError>;

    /// Estimated future reward of `state` as seen by `vehicle_id` at `time`.
    ///
    /// Encodes the state with [`get_state_features`](Self::get_state_features)
    /// and scores the features. Fails with [`PolicyError::ValueFunctionNotSetUp`]
    /// before [`setup`](Self::setup).
    fn estimate_value(&self, state: &State, vehicle_id: usize, time: f64) -> Result<f64, PolicyError> {
        let features = self.get_state_features(state, vehicle_id, time)?;
        self.estimate_value_from_state_features(&features)
    }

    /// Fixed-length feature vector of `state`.
    fn get_state_features(
        &self,
        state: &State,
        vehicle_id: usize,
        time: f64,
    ) -> Result<Vec<f64>, PolicyError>;

    /// Online update after an action was taken.
    ///
    /// `next_value` is already discounted to the time of the decision.
    fn update_weights(
        &mut self,
        features: &[f64],
        current_value: f64,
        next_value: f64,
        reward: f64,
    ) -> Result<(), PolicyError>;
}

/// Encodes a state as a flat `Vec<f64>`.
///
/// Layout:
/// ```text
/// [cluster_0(3)] ++ ... ++ [cluster_{n-1}(3)] ++ [vehicle(2)] ++ [location one-hot] ++ [time]
/// ```
/// Per cluster: signed deviation from the ideal state relative to the ideal
/// state, mean battery deficiency and trip intensity per scooter. Per
/// vehicle: battery and scooter inventory as fractions of capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateFeatures {
    n_clusters: usize,
    n_locations: usize,
    time_scale: f64,
}

impl StateFeatures {
    pub const CLUSTER_FEATURE_DIM: usize = 3;
    pub const VEHICLE_FEATURE_DIM: usize = 2;

    /// An encoder sized to `state`.
    pub fn for_state(state: &State) -> Self {
        Self {
            n_clusters: state.number_of_clusters(),
            n_locations: state.locations.len(),
            time_scale: 1.0,
        }
    }

    /// Divides the time feature by `scale`, typically the shift duration.
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = if scale > 0.0 { scale } else { 1.0 };
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Length of every encoded vector.
    pub fn dim(&self) -> usize {
        Self::dim_for(self.n_clusters, self.n_locations)
    }

    fn dim_for(n_clusters: usize, n_locations: usize) -> usize {
        n_clusters * Self::CLUSTER_FEATURE_DIM + Self::VEHICLE_FEATURE_DIM + n_locations + 1
    }

    pub fn build(&self, state: &State, vehicle_id: usize, time: f64) -> Result<Vec<f64>, PolicyError> {
        let found = Self::dim_for(state.number_of_clusters(), state.locations.len());
        if found != self.dim() {
            return Err(PolicyError::FeatureLength {
                expected: self.dim(),
                found,
            });
        }

        let mut features = Vec::with_capacity(self.dim());
        for cluster in state.clusters() {
            let n = cluster.number_of_scooters() as f64;
            let ideal = cluster.ideal_state.max(1) as f64;
            features.push((n - cluster.ideal_state as f64) / ideal);
            features.push(cluster.battery_deficiency() / n.max(1.0));
            features.push(cluster.trip_intensity_per_iteration / n.max(1.0));
        }

        let vehicle = state.vehicle(vehicle_id)?;
        features.push(
            vehicle.battery_inventory as f64 / vehicle.battery_inventory_capacity.max(1) as f64,
        );
        features.push(
            vehicle.scooter_inventory.len() as f64
                / vehicle.scooter_inventory_capacity.max(1) as f64,
        );

        let mut location = vec![0.0; self.n_locations];
        if let Some(slot) = location.get_mut(vehicle.current_location) {
            *slot = 1.0;
        }
        features.extend(location);
        features.push(time / self.time_scale);

        Ok(features)
    }
}
