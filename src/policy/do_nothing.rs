//! Baseline that only drives around.

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use crate::state::Action;

/// Moves every vehicle to its best-ranked neighbour without servicing anything.
///
/// Lower-bound baseline: the fleet is left to demand alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoNothingPolicy;

impl Policy for DoNothingPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        Ok(Action::relocate(ctx.best_neighbour(vehicle_id)?))
    }

    fn name(&self) -> &str {
        "do_nothing"
    }
}
