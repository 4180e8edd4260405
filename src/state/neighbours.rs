//! Candidate destinations for a vehicle.
//!
//! Clusters are ranked by a weighted sum of normalised distance and
//! normalised need (deviation from ideal state plus battery deficiency).
//! Closer and needier clusters rank first.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use super::{State, StateError};
use crate::config::{ActionSpaceParams, SimulationConfig};
use crate::entities::Cluster;

/// A cluster scored for neighbour ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedNeighbour {
    pub id: usize,
    pub distance: f64,
    pub need: f64,
    /// Lower is better.
    pub score: f64,
}

fn need(cluster: &Cluster) -> f64 {
    cluster.deviation_from_ideal_state() as f64 + cluster.battery_deficiency()
}

impl State {
    /// Ranks every cluster except the vehicle's location and `exclude`.
    pub fn rank_neighbours(
        &self,
        vehicle_id: usize,
        exclude: &[usize],
        config: &SimulationConfig,
    ) -> Result<Vec<RankedNeighbour>, StateError> {
        let current = self.vehicle(vehicle_id)?.current_location;

        let mut ranked = Vec::new();
        for cluster in self.clusters() {
            if cluster.id == current || exclude.contains(&cluster.id) {
                continue;
            }
            ranked.push(RankedNeighbour {
                id: cluster.id,
                distance: self.get_distance(current, cluster.id)?,
                need: need(cluster),
                score: 0.0,
            });
        }

        let max_distance = ranked.iter().map(|n| n.distance).fold(0.0, f64::max);
        let max_need = ranked.iter().map(|n| n.need).fold(0.0, f64::max);
        for n in &mut ranked {
            let d = if max_distance > 0.0 { n.distance / max_distance } else { 0.0 };
            let q = if max_need > 0.0 { n.need / max_need } else { 0.0 };
            n.score = config.neighbour_distance_weight * d - config.neighbour_need_weight * q;
        }
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.id.cmp(&b.id)));
        Ok(ranked)
    }

    /// Depots with at least one charged battery at `time`, nearest first.
    pub fn depot_candidates(
        &self,
        vehicle_id: usize,
        time: f64,
    ) -> Result<Vec<usize>, StateError> {
        let current = self.vehicle(vehicle_id)?.current_location;
        let mut depots: Vec<(usize, f64)> = Vec::new();
        for depot in self.depots() {
            if depot.id == current || depot.get_available_battery_swaps(time) < 1.0 {
                continue;
            }
            depots.push((depot.id, self.get_distance(current, depot.id)?));
        }
        depots.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(depots.into_iter().map(|(id, _)| id).collect())
    }

    /// Candidate next locations for a vehicle.
    ///
    /// Takes the `number_of_neighbours` best-ranked clusters, appends up to
    /// `random_neighbours` further clusters drawn uniformly, and appends
    /// depots when the battery inventory is low. When nothing is left the
    /// nearest depot is offered; an empty result means the vehicle has
    /// nowhere to go.
    pub fn get_neighbours<R: Rng + ?Sized>(
        &self,
        vehicle_id: usize,
        params: &ActionSpaceParams,
        exclude: &[usize],
        time: f64,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Vec<usize>, StateError> {
        let vehicle = self.vehicle(vehicle_id)?;
        let ranked = self.rank_neighbours(vehicle_id, exclude, config)?;

        let split = params.number_of_neighbours.min(ranked.len());
        let mut neighbours: Vec<usize> = ranked[..split].iter().map(|n| n.id).collect();

        if params.random_neighbours > 0 {
            let rest: Vec<usize> = ranked[split..].iter().map(|n| n.id).collect();
            neighbours.extend(rest.choose_multiple(rng, params.random_neighbours).copied());
        }

        if vehicle.battery_inventory <= config.low_battery_threshold() {
            neighbours.extend(
                self.depot_candidates(vehicle_id, time)?
                    .into_iter()
                    .filter(|id| !exclude.contains(id)),
            );
        }

        if neighbours.is_empty() {
            let mut depots = Vec::new();
            for depot in self.depots().filter(|d| d.id != vehicle.current_location) {
                depots.push((depot.id, self.get_distance(vehicle.current_location, depot.id)?));
            }
            let fallback = depots
                .into_iter()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id);
            warn!(
                vehicle = vehicle_id,
                location = vehicle.current_location,
                fallback = ?fallback,
                "no neighbour clusters available"
            );
            neighbours.extend(fallback);
        }

        Ok(neighbours)
    }
}
