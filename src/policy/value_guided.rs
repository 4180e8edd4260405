//! Policy guided by an injected value function.

use rand::Rng;

use super::error::PolicyError;
use super::trait_::{DecisionContext, Policy};
use super::value_function::ValueFunction;
use crate::state::Action;

/// Picks the action maximising immediate reward plus the discounted value
/// of the state it leads to.
///
/// Each candidate is applied to the state, scored and rolled back with
/// [`State::evaluate_action`](crate::state::State::evaluate_action). With
/// probability `epsilon` a uniformly random candidate is taken instead.
/// After every decision the value function receives an online update.
pub struct ValueFunctionPolicy {
    value_function: Box<dyn ValueFunction>,
    epsilon: f64,
}

impl ValueFunctionPolicy {
    /// Creates a greedy policy. The value function must already be set up.
    pub fn new(value_function: Box<dyn ValueFunction>) -> Self {
        Self {
            value_function,
            epsilon: 0.0,
        }
    }

    /// Explores with probability `epsilon`, clamped to `[0, 1]`.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn value_function(&self) -> &dyn ValueFunction {
        self.value_function.as_ref()
    }
}

#[derive(Clone, Copy)]
struct Scored {
    reward: f64,
    next_value: f64,
}

impl Scored {
    fn total(&self) -> f64 {
        self.reward + self.next_value
    }
}

impl Policy for ValueFunctionPolicy {
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError> {
        let mut candidates = ctx.possible_actions(vehicle_id)?;
        if candidates.is_empty() {
            return Err(PolicyError::NoCandidateActions { vehicle_id });
        }

        let vf = self.value_function.as_ref();
        let features = vf.get_state_features(ctx.state, vehicle_id, ctx.time)?;
        let current_value = vf.estimate_value(ctx.state, vehicle_id, ctx.time)?;
        let current = ctx.state.vehicle(vehicle_id)?.current_location;

        let mut scores = Vec::with_capacity(candidates.len());
        for action in &candidates {
            let distance = ctx.state.get_distance(current, action.next_location)?;
            let travel = action.get_action_time(distance, ctx.config);
            let arrival = ctx.time + travel;
            let (outcome, next_value) =
                ctx.state
                    .evaluate_action(action, vehicle_id, ctx.time, ctx.config, |next| {
                        vf.estimate_value(next, vehicle_id, arrival)
                    })?;
            scores.push(Scored {
                reward: outcome.reward,
                next_value: ctx.config.discount(travel) * next_value?,
            });
        }

        let mut chosen = 0;
        for (i, s) in scores.iter().enumerate().skip(1) {
            if s.total() > scores[chosen].total() {
                chosen = i;
            }
        }
        if self.epsilon > 0.0 && ctx.rng.gen::<f64>() < self.epsilon {
            chosen = ctx.rng.gen_range(0..candidates.len());
        }

        let Scored { reward, next_value } = scores[chosen];
        self.value_function
            .update_weights(&features, current_value, next_value, reward)?;

        Ok(candidates.swap_remove(chosen))
    }

    fn name(&self) -> &str {
        "value_function"
    }
}
