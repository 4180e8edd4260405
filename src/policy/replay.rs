//! Replays routes planned outside the simulation.

use std::collections::VecDeque;

use tracing::warn;

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use crate::state::Action;

/// Plays back a fixed action sequence per vehicle.
///
/// Used to evaluate routes produced by an external optimiser inside the
/// simulation. When a vehicle's plan is exhausted, or its next planned
/// destination is tabu, the vehicle just drives to its best-ranked neighbour.
#[derive(Debug, Clone, Default)]
pub struct ReplayPolicy {
    plans: Vec<VecDeque<Action>>,
}

impl ReplayPolicy {
    /// `plans[v]` is the action sequence of vehicle `v`.
    pub fn new(plans: Vec<Vec<Action>>) -> Self {
        Self {
            plans: plans.into_iter().map(VecDeque::from).collect(),
        }
    }

    /// Planned actions not yet played for `vehicle_id`.
    pub fn remaining(&self, vehicle_id: usize) -> usize {
        self.plans.get(vehicle_id).map_or(0, VecDeque::len)
    }
}

impl Policy for ReplayPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        let planned = self
            .plans
            .get_mut(vehicle_id)
            .and_then(VecDeque::pop_front);
        match planned {
            Some(action) if !ctx.is_tabu(action.next_location) => Ok(action),
            Some(action) => {
                warn!(
                    vehicle = vehicle_id,
                    location = action.next_location,
                    "planned destination is tabu, skipping planned action"
                );
                Ok(Action::relocate(ctx.best_neighbour(vehicle_id)?))
            }
            None => Ok(Action::relocate(ctx.best_neighbour(vehicle_id)?)),
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
