//! Swap every battery, then move on.

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use crate::state::Action;

/// Swaps the battery of every scooter below full charge at the current
/// cluster (lowest first, as far as the battery inventory allows), then
/// drives to the best-ranked neighbour. Never picks up or delivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapAllPolicy;

impl Policy for SwapAllPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        let next = ctx.best_neighbour(vehicle_id)?;
        let vehicle = ctx.state.vehicle(vehicle_id)?;
        let Some(cluster) = ctx.state.location(vehicle.current_location)?.as_cluster() else {
            return Ok(Action::relocate(next));
        };

        let swaps = cluster
            .get_swappable_scooters()
            .into_iter()
            .take(vehicle.battery_inventory)
            .map(|s| s.id)
            .collect();
        Ok(Action::new(swaps, Vec::new(), Vec::new(), next))
    }

    fn name(&self) -> &str {
        "swap_all"
    }
}
