//! Enumeration of the feasible actions of a vehicle.

use rand::Rng;

use super::{Action, Site, State, StateError};
use crate::config::{ActionSpaceParams, SimulationConfig};
use crate::entities::FULL_BATTERY;

/// Counts `0..=max`, thinned to about `divide` evenly spaced values.
///
/// Zero and `max` are always included.
pub fn count_range(max: usize, divide: Option<usize>) -> Vec<usize> {
    match divide {
        Some(parts) if parts > 0 && max > parts => {
            let step = max.div_ceil(parts);
            let mut counts: Vec<usize> = (0..=max).step_by(step).collect();
            if counts.last() != Some(&max) {
                counts.push(max);
            }
            counts
        }
        _ => (0..=max).collect(),
    }
}

/// Upper bounds on each operation for a vehicle at a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationBounds {
    pub swaps: usize,
    pub pick_ups: usize,
    pub drop_offs: usize,
}

impl State {
    /// Independent upper bounds for swaps, pick-ups and drop-offs.
    ///
    /// Returns all zeros when the vehicle is at a depot.
    pub fn operation_bounds(&self, vehicle_id: usize) -> Result<OperationBounds, StateError> {
        let vehicle = self.vehicle(vehicle_id)?;
        let Site::Cluster(cluster) = self.location(vehicle.current_location)? else {
            return Ok(OperationBounds {
                swaps: 0,
                pick_ups: 0,
                drop_offs: 0,
            });
        };

        Ok(OperationBounds {
            pick_ups: cluster.excess().min(vehicle.scooter_room()),
            swaps: cluster
                .number_of_scooters()
                .min(cluster.get_swappable_scooters().len())
                .min(vehicle.battery_inventory),
            drop_offs: cluster.deficit().min(vehicle.scooter_inventory.len()),
        })
    }

    /// Every feasible action for a vehicle at its current location.
    ///
    /// At a depot: one relocation per candidate neighbour. At a cluster: the
    /// product of swap, pick-up and drop-off counts and neighbours, keeping
    /// combinations where swaps plus pick-ups fit both the battery inventory
    /// and the scooters present. Pick-ups take the lowest-battery scooters,
    /// swaps the next lowest below full battery, deliveries the first
    /// scooters in the vehicle inventory.
    ///
    /// If no neighbour is reachable the single candidate is to stay put.
    pub fn get_possible_actions<R: Rng + ?Sized>(
        &self,
        vehicle_id: usize,
        params: &ActionSpaceParams,
        exclude: &[usize],
        time: f64,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Vec<Action>, StateError> {
        let vehicle = self.vehicle(vehicle_id)?;
        let mut neighbours = self.get_neighbours(vehicle_id, params, exclude, time, config, rng)?;
        if neighbours.is_empty() {
            neighbours.push(vehicle.current_location);
        }

        let Site::Cluster(cluster) = self.location(vehicle.current_location)? else {
            return Ok(neighbours.into_iter().map(Action::relocate).collect());
        };

        let bounds = self.operation_bounds(vehicle_id)?;
        let by_battery: Vec<usize> = cluster.scooters_by_battery().iter().map(|s| s.id).collect();
        let swappable = cluster
            .scooters
            .iter()
            .filter(|s| s.battery < FULL_BATTERY)
            .count();
        let present = cluster.number_of_scooters();

        let mut actions = Vec::new();
        for swaps in count_range(bounds.swaps, params.divide) {
            for pick_ups in count_range(bounds.pick_ups, params.divide) {
                if swaps + pick_ups > vehicle.battery_inventory || swaps + pick_ups > present {
                    continue;
                }
                if swaps > 0 && pick_ups + swaps > swappable {
                    continue;
                }
                for drop_offs in count_range(bounds.drop_offs, params.divide) {
                    let pick_up_ids = &by_battery[..pick_ups];
                    let swap_ids = &by_battery[pick_ups..pick_ups + swaps];
                    let delivery_ids: Vec<usize> = vehicle.scooter_inventory[..drop_offs]
                        .iter()
                        .map(|s| s.id)
                        .collect();
                    for &next in &neighbours {
                        actions.push(Action::new(
                            swap_ids.to_vec(),
                            pick_up_ids.to_vec(),
                            delivery_ids.clone(),
                            next,
                        ));
                    }
                }
            }
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_without_divide() {
        assert_eq!(count_range(3, None), vec![0, 1, 2, 3]);
        assert_eq!(count_range(0, None), vec![0]);
    }

    #[test]
    fn divided_range_keeps_bounds() {
        assert_eq!(count_range(10, Some(3)), vec![0, 4, 8, 10]);
        assert_eq!(count_range(9, Some(3)), vec![0, 3, 6, 9]);
    }

    #[test]
    fn divide_larger_than_max_is_full_range() {
        assert_eq!(count_range(2, Some(5)), vec![0, 1, 2]);
        assert_eq!(count_range(4, Some(0)), vec![0, 1, 2, 3, 4]);
    }
}
