//! Policy trait consumed by vehicle arrivals.

use rand::rngs::StdRng;

use super::error::PolicyError;
use crate::config::SimulationConfig;
use crate::state::{Action, State, StateError};

/// What a policy sees when a vehicle asks for its next action.
///
/// The state is borrowed mutably so policies can try actions out with
/// [`State::evaluate_action`]; they must leave it as they found it.
pub struct DecisionContext<'a> {
    pub state: &'a mut State,
    /// Locations the vehicle may not be sent to.
    pub tabu_list: &'a [usize],
    pub time: f64,
    pub config: &'a SimulationConfig,
    pub rng: &'a mut StdRng,
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        state: &'a mut State,
        tabu_list: &'a [usize],
        time: f64,
        config: &'a SimulationConfig,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            state,
            tabu_list,
            time,
            config,
            rng,
        }
    }

    pub fn is_tabu(&self, location_id: usize) -> bool {
        self.tabu_list.contains(&location_id)
    }

    /// Feasible actions from the vehicle's location, avoiding tabu locations.
    pub fn possible_actions(&mut self, vehicle_id: usize) -> Result<Vec<Action>, StateError> {
        self.state.get_possible_actions(
            vehicle_id,
            &self.config.action_space,
            self.tabu_list,
            self.time,
            self.config,
            &mut *self.rng,
        )
    }

    /// Candidate next locations, avoiding tabu locations.
    pub fn neighbours(&mut self, vehicle_id: usize) -> Result<Vec<usize>, StateError> {
        self.state.get_neighbours(
            vehicle_id,
            &self.config.action_space,
            self.tabu_list,
            self.time,
            self.config,
            &mut *self.rng,
        )
    }

    /// The first candidate location, or the current one if there is none.
    pub fn best_neighbour(&mut self, vehicle_id: usize) -> Result<usize, StateError> {
        let current = self.state.vehicle(vehicle_id)?.current_location;
        Ok(self.neighbours(vehicle_id)?.first().copied().unwrap_or(current))
    }
}

/// A decision maker for service vehicles.
///
/// Implementations must tolerate an empty or single-element candidate set
/// and must never send a vehicle to a location in the tabu list.
pub trait Policy: Send + Sync {
    /// Chooses the action of `vehicle_id` at its current location.
    fn get_best_action(
        &mut self,
        ctx: &mut DecisionContext<'_>,
        vehicle_id: usize,
    ) -> Result<Action, PolicyError>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
