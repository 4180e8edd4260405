//! System state: every location, every vehicle and the distances between them.
//!
//! Locations are addressed by id, which is also their index: clusters are
//! numbered `0..n_clusters`, depots follow. The distance matrix is computed
//! once from location positions; clusters are fixed for a run, only scooter
//! and vehicle membership changes.

pub mod action;
pub mod actions;
pub mod checkpoint;
pub mod error;
pub mod neighbours;


use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::entities::{Cluster, Depot, EntityError, GeoPoint, Location, Scooter, Vehicle};

pub use action::{Action, ActionOutcome};
pub use checkpoint::StateCheckpoint;
pub use error::StateError;

/// A location of the state: a cluster of scooters or a battery depot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Site {
    Cluster(Cluster),
    Depot(Depot),
}

impl Site {
    pub fn as_cluster(&self) -> Option<&Cluster> {
        match self {
            Site::Cluster(c) => Some(c),
            Site::Depot(_) => None,
        }
    }

    pub fn as_cluster_mut(&mut self) -> Option<&mut Cluster> {
        match self {
            Site::Cluster(c) => Some(c),
            Site::Depot(_) => None,
        }
    }

    pub fn as_depot(&self) -> Option<&Depot> {
        match self {
            Site::Depot(d) => Some(d),
            Site::Cluster(_) => None,
        }
    }

    pub fn is_depot(&self) -> bool {
        matches!(self, Site::Depot(_))
    }
}

impl Location for Site {
    fn id(&self) -> usize {
        match self {
            Site::Cluster(c) => c.id,
            Site::Depot(d) => d.id,
        }
    }

    fn position(&self) -> GeoPoint {
        match self {
            Site::Cluster(c) => c.center,
            Site::Depot(d) => d.position,
        }
    }
}

/// Aggregate of all clusters, depots and vehicles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    pub locations: Vec<Site>,
    pub vehicles: Vec<Vehicle>,
    distance_matrix: Vec<Vec<f64>>,
}

impl State {
    /// Builds a state and its distance matrix.
    ///
    /// Requires cluster ids `0..clusters.len()`, depot ids following them,
    /// vehicle ids equal to their index, known vehicle start locations,
    /// globally unique scooter ids and move-probability rows (when set)
    /// with one entry per cluster.
    pub fn new(
        clusters: Vec<Cluster>,
        depots: Vec<Depot>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, StateError> {
        let n_clusters = clusters.len();
        let locations: Vec<Site> = clusters
            .into_iter()
            .map(Site::Cluster)
            .chain(depots.into_iter().map(Site::Depot))
            .collect();

        for (index, site) in locations.iter().enumerate() {
            if site.id() != index {
                return Err(StateError::LocationIdMismatch {
                    index,
                    id: site.id(),
                });
            }
            if let Some(row) = site.as_cluster().and_then(|c| c.move_probabilities.as_ref()) {
                if row.len() != n_clusters {
                    return Err(EntityError::MoveProbabilitiesLength {
                        cluster_id: index,
                        expected: n_clusters,
                        found: row.len(),
                    }
                    .into());
                }
            }
        }
        for (index, vehicle) in vehicles.iter().enumerate() {
            if vehicle.id != index {
                return Err(StateError::VehicleIdMismatch {
                    index,
                    id: vehicle.id,
                });
            }
            if vehicle.current_location >= locations.len() {
                return Err(StateError::UnknownLocation(vehicle.current_location));
            }
        }

        let mut state = Self {
            locations,
            vehicles,
            distance_matrix: Vec::new(),
        };

        let mut seen = HashSet::new();
        for scooter in state.all_scooters() {
            if !seen.insert(scooter.id) {
                return Err(StateError::DuplicateScooterId(scooter.id));
            }
        }

        state.compute_distance_matrix();
        Ok(state)
    }

    /// Recomputes pairwise haversine distances between location positions.
    pub fn compute_distance_matrix(&mut self) {
        self.distance_matrix = self
            .locations
            .iter()
            .map(|a| {
                self.locations
                    .iter()
                    .map(|b| a.distance_to_location(b))
                    .collect()
            })
            .collect();
    }

    /// Distance in kilometres between two locations.
    pub fn get_distance(&self, from: usize, to: usize) -> Result<f64, StateError> {
        self.distance_matrix
            .get(from)
            .ok_or(StateError::UnknownLocation(from))?
            .get(to)
            .copied()
            .ok_or(StateError::UnknownLocation(to))
    }

    pub fn distance_matrix(&self) -> &[Vec<f64>] {
        &self.distance_matrix
    }

    pub fn location(&self, id: usize) -> Result<&Site, StateError> {
        self.locations.get(id).ok_or(StateError::UnknownLocation(id))
    }

    pub fn cluster(&self, id: usize) -> Result<&Cluster, StateError> {
        self.location(id)?
            .as_cluster()
            .ok_or(StateError::NotACluster(id))
    }

    pub fn cluster_mut(&mut self, id: usize) -> Result<&mut Cluster, StateError> {
        self.locations
            .get_mut(id)
            .ok_or(StateError::UnknownLocation(id))?
            .as_cluster_mut()
            .ok_or(StateError::NotACluster(id))
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.locations.iter().filter_map(Site::as_cluster)
    }

    pub fn depots(&self) -> impl Iterator<Item = &Depot> + '_ {
        self.locations.iter().filter_map(Site::as_depot)
    }

    pub fn number_of_clusters(&self) -> usize {
        self.clusters().count()
    }

    pub fn is_depot(&self, id: usize) -> bool {
        self.locations.get(id).is_some_and(Site::is_depot)
    }

    pub fn vehicle(&self, id: usize) -> Result<&Vehicle, StateError> {
        self.vehicles.get(id).ok_or(StateError::UnknownVehicle(id))
    }

    pub fn vehicle_mut(&mut self, id: usize) -> Result<&mut Vehicle, StateError> {
        self.vehicles.get_mut(id).ok_or(StateError::UnknownVehicle(id))
    }

    /// Every scooter parked in a cluster or loaded on a vehicle.
    pub fn all_scooters(&self) -> impl Iterator<Item = &Scooter> + '_ {
        self.clusters()
            .flat_map(|c| c.scooters.iter())
            .chain(self.vehicles.iter().flat_map(|v| v.scooter_inventory.iter()))
    }

    /// Number of scooters parked in clusters or loaded on vehicles.
    pub fn total_scooters(&self) -> usize {
        self.clusters().map(Cluster::number_of_scooters).sum::<usize>()
            + self
                .vehicles
                .iter()
                .map(|v| v.scooter_inventory.len())
                .sum::<usize>()
    }

    /// Sum of battery levels over all parked and loaded scooters.
    pub fn total_battery(&self) -> f64 {
        self.all_scooters().map(|s| s.battery).sum()
    }

    /// Sum over clusters of the distance to the ideal state.
    pub fn total_deviation_from_ideal_state(&self) -> usize {
        self.clusters().map(Cluster::deviation_from_ideal_state).sum()
    }

    /// Executes an action for a vehicle at its current location.
    ///
    /// At a cluster: pick-ups, then swaps, then deliveries. At a depot the
    /// vehicle first refills its battery inventory. Finally the vehicle moves
    /// to `action.next_location`.
    ///
    /// The whole action is checked against the vehicle and the site before
    /// anything changes, so an `Err` leaves the state untouched.
    pub fn do_action(
        &mut self,
        action: &Action,
        vehicle_id: usize,
        time: f64,
        config: &SimulationConfig,
    ) -> Result<ActionOutcome, StateError> {
        if action.next_location >= self.locations.len() {
            return Err(StateError::UnknownLocation(action.next_location));
        }
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or(StateError::UnknownVehicle(vehicle_id))?;
        let site = self
            .locations
            .get_mut(vehicle.current_location)
            .ok_or(StateError::UnknownLocation(vehicle.current_location))?;

        let mut outcome = ActionOutcome::default();
        match site {
            Site::Depot(depot) => {
                if action.has_operations() {
                    return Err(StateError::OperationsAtDepot { depot_id: depot.id });
                }
                let available = depot.get_available_battery_swaps(time).floor() as usize;
                let n = vehicle.flat_batteries().min(available);
                if n > 0 {
                    outcome.wait_time =
                        depot.swap_battery_inventory(time, n, config.swap_time_per_battery)?;
                    vehicle.add_battery_inventory(n);
                    outcome.batteries_refilled = n;
                }
            }
            Site::Cluster(cluster) => {
                check_cluster_action(cluster, vehicle, action)?;

                for &scooter_id in &action.pick_ups {
                    let scooter = cluster.remove_scooter(scooter_id)?;
                    vehicle.pick_up(scooter)?;
                }

                let usage = cluster.prob_of_scooter_usage(config.battery_limit);
                let ideal_state = cluster.ideal_state;
                for (count, &scooter_id) in action.battery_swaps.iter().enumerate() {
                    let scooter = cluster.get_scooter_mut(scooter_id)?;
                    let prior = scooter.battery;
                    vehicle.change_battery(scooter)?;
                    if count < ideal_state {
                        outcome.reward += (100.0 - prior) / 100.0 * usage;
                    }
                }

                for &scooter_id in &action.delivery_scooters {
                    let scooter = vehicle.drop_off(scooter_id)?;
                    cluster.add_scooter(scooter)?;
                    outcome.reward += config.delivery_reward;
                }
            }
        }

        vehicle.set_current_location(action.next_location);
        Ok(outcome)
    }
}

/// Rejects an action the vehicle cannot carry out at `cluster`.
///
/// Pick-ups and swaps must name distinct scooters of the cluster, deliveries
/// distinct scooters on board (or picked up by the same action).
fn check_cluster_action(
    cluster: &Cluster,
    vehicle: &Vehicle,
    action: &Action,
) -> Result<(), StateError> {
    if action.pick_ups.len() > vehicle.scooter_room() {
        return Err(EntityError::ScooterInventoryFull {
            vehicle_id: vehicle.id,
            capacity: vehicle.scooter_inventory_capacity,
        }
        .into());
    }
    if action.batteries_used() > vehicle.battery_inventory {
        return Err(EntityError::BatteryInventoryEmpty {
            vehicle_id: vehicle.id,
        }
        .into());
    }

    let mut touched = HashSet::new();
    for &scooter_id in action.pick_ups.iter().chain(&action.battery_swaps) {
        if !cluster.contains(scooter_id) || !touched.insert(scooter_id) {
            return Err(EntityError::ScooterNotInCluster {
                cluster_id: cluster.id,
                scooter_id,
            }
            .into());
        }
    }

    let mut delivered = HashSet::new();
    for &scooter_id in &action.delivery_scooters {
        let on_board = vehicle.scooter_inventory.iter().any(|s| s.id == scooter_id)
            || action.pick_ups.contains(&scooter_id);
        if !on_board || !delivered.insert(scooter_id) {
            return Err(EntityError::ScooterNotInInventory {
                vehicle_id: vehicle.id,
                scooter_id,
            }
            .into());
        }
    }
    Ok(())
}
