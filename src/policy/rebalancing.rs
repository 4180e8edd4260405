//! Rule-based rebalancing heuristic.
//!
//! At a cluster the vehicle:
//! 1. picks up the excess over the ideal state (emptiest scooters first),
//! 2. swaps the remaining scooters below full charge with what batteries
//!    are left,
//! 3. delivers scooters it carries while the cluster is below its ideal state.
//!
//! The next stop is a depot when the battery inventory runs low, the
//! neighbour with the largest deficit while scooters are on board, and the
//! best-ranked neighbour otherwise.

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use crate::entities::FULL_BATTERY;
use crate::state::Action;

/// Greedy pick-up / swap / deliver policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebalancingPolicy;

impl Policy for RebalancingPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        let vehicle = ctx.state.vehicle(vehicle_id)?;

        let (swaps, pick_ups, deliveries) =
            match ctx.state.location(vehicle.current_location)?.as_cluster() {
                Some(cluster) => {
                    let by_battery = cluster.scooters_by_battery();
                    let n_pick_ups = cluster
                        .excess()
                        .min(vehicle.scooter_room())
                        .min(vehicle.battery_inventory);
                    let pick_ups: Vec<usize> =
                        by_battery[..n_pick_ups].iter().map(|s| s.id).collect();
                    let swaps: Vec<usize> = by_battery[n_pick_ups..]
                        .iter()
                        .filter(|s| s.battery < FULL_BATTERY)
                        .take(vehicle.battery_inventory - n_pick_ups)
                        .map(|s| s.id)
                        .collect();
                    let n_deliveries = cluster.deficit().min(vehicle.scooter_inventory.len());
                    let deliveries: Vec<usize> = vehicle.scooter_inventory[..n_deliveries]
                        .iter()
                        .map(|s| s.id)
                        .collect();
                    (swaps, pick_ups, deliveries)
                }
                None => (Vec::new(), Vec::new(), Vec::new()),
            };

        let batteries_left = vehicle.battery_inventory - pick_ups.len() - swaps.len();
        let carrying = vehicle.scooter_inventory.len() + pick_ups.len() - deliveries.len();

        let mut next = None;
        if batteries_left <= ctx.config.low_battery_threshold() {
            next = ctx
                .state
                .depot_candidates(vehicle_id, ctx.time)?
                .into_iter()
                .find(|&id| !ctx.is_tabu(id));
        }
        if next.is_none() {
            let ranked = ctx
                .state
                .rank_neighbours(vehicle_id, ctx.tabu_list, ctx.config)?;
            next = if carrying > 0 {
                // Largest deficit, earliest rank on ties.
                let mut best: Option<(usize, usize)> = None;
                for n in &ranked {
                    let deficit = ctx.state.cluster(n.id)?.deficit();
                    if deficit > 0 && best.map_or(true, |(_, d)| deficit > d) {
                        best = Some((n.id, deficit));
                    }
                }
                best.map(|(id, _)| id).or(ranked.first().map(|n| n.id))
            } else {
                ranked.first().map(|n| n.id)
            };
        }
        let next = match next {
            Some(id) => id,
            None => ctx.best_neighbour(vehicle_id)?,
        };

        Ok(Action::new(swaps, pick_ups, deliveries, next))
    }

    fn name(&self) -> &str {
        "rebalancing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::test_support::small_state;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_up_excess_and_heads_for_deficit() {
        let config = SimulationConfig::default();
        let mut state = small_state(&config);
        state.vehicles[0].current_location = 1;
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = DecisionContext::new(&mut state, &[], 0.0, &config, &mut rng);

        let action = RebalancingPolicy.get_best_action(&mut ctx, 0).unwrap();
        assert_eq!(action.pick_ups, vec![5, 6, 7, 8]);
        // 70 % and 90 % scooters; the two full ones are left alone
        assert_eq!(action.battery_swaps, vec![9, 10]);
        assert!(action.delivery_scooters.is_empty());
        assert_eq!(action.next_location, 2);
    }

    #[test]
    fn delivers_into_deficit() {
        let config = SimulationConfig::default();
        let mut state = small_state(&config);
        state.vehicles[0].current_location = 1;
        state
            .do_action(&Action::new(vec![], vec![5, 6], vec![], 2), 0, 0.0, &config)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = DecisionContext::new(&mut state, &[], 10.0, &config, &mut rng);

        let action = RebalancingPolicy.get_best_action(&mut ctx, 0).unwrap();
        assert_eq!(action.delivery_scooters, vec![5, 6]);
        assert_eq!(action.battery_swaps, vec![13]);
        assert!(action.pick_ups.is_empty());
        state.do_action(&action, 0, 10.0, &config).unwrap();
        assert_eq!(state.cluster(2).unwrap().number_of_scooters(), 3);
    }

    #[test]
    fn low_batteries_send_vehicle_to_depot() {
        let config = SimulationConfig::default();
        let mut state = small_state(&config);
        state.vehicles[0].battery_inventory = 3;
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = DecisionContext::new(&mut state, &[], 0.0, &config, &mut rng);

        let action = RebalancingPolicy.get_best_action(&mut ctx, 0).unwrap();
        assert_eq!(action.battery_swaps.len(), 3);
        assert_eq!(action.next_location, 3);
    }

    #[test]
    fn respects_tabu() {
        let config = SimulationConfig::default();
        let mut state = small_state(&config);
        state.vehicles[0].current_location = 1;
        let mut rng = StdRng::seed_from_u64(0);
        let tabu = [2];
        let mut ctx = DecisionContext::new(&mut state, &tabu, 0.0, &config, &mut rng);

        let action = RebalancingPolicy.get_best_action(&mut ctx, 0).unwrap();
        assert_eq!(action.next_location, 0);
    }
}
