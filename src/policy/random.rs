//! Random policy for testing and baselines.

use rand::seq::SliceRandom;

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use crate::state::Action;

/// Uniformly random choice among the feasible actions.
///
/// Used for sanity checks and as a lower-bound baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomActionPolicy;

impl Policy for RandomActionPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        let candidates = ctx.possible_actions(vehicle_id)?;
        candidates
            .choose(&mut *ctx.rng)
            .cloned()
            .ok_or(PolicyError::NoCandidateActions { vehicle_id })
    }

    fn name(&self) -> &str {
        "random"
    }
}
