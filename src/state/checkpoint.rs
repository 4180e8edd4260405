//! Structural snapshots for what-if evaluation of actions.
//!
//! Executing an action only touches the vehicle and the site it stands at,
//! so a checkpoint copies just those two and restoring puts them back.

use super::{Action, ActionOutcome, Site, State, StateError};
use crate::config::SimulationConfig;
use crate::entities::{Location, Vehicle};

/// Copy of the parts of a [`State`] that one action can mutate.
#[derive(Debug, Clone, PartialEq)]
pub struct StateCheckpoint {
    site: Site,
    vehicle: Vehicle,
}

impl State {
    /// Captures the vehicle and its current site.
    pub fn checkpoint(&self, vehicle_id: usize) -> Result<StateCheckpoint, StateError> {
        let vehicle = self.vehicle(vehicle_id)?.clone();
        let site = self.location(vehicle.current_location)?.clone();
        Ok(StateCheckpoint { site, vehicle })
    }

    /// Puts the captured site and vehicle back.
    ///
    /// Fails without changing anything if the checkpoint names a location
    /// or vehicle this state does not have.
    pub fn restore(&mut self, checkpoint: StateCheckpoint) -> Result<(), StateError> {
        let site_id = checkpoint.site.id();
        let vehicle_id = checkpoint.vehicle.id;
        if site_id >= self.locations.len() {
            return Err(StateError::UnknownLocation(site_id));
        }
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or(StateError::UnknownVehicle(vehicle_id))?;
        *vehicle = checkpoint.vehicle;
        self.locations[site_id] = checkpoint.site;
        Ok(())
    }

    /// Applies an action, inspects the resulting state, then rolls back.
    ///
    /// `inspect` sees the state after the action; its result is returned
    /// together with the action outcome. The state is restored even if the
    /// action fails.
    pub fn evaluate_action<T>(
        &mut self,
        action: &Action,
        vehicle_id: usize,
        time: f64,
        config: &SimulationConfig,
        inspect: impl FnOnce(&State) -> T,
    ) -> Result<(ActionOutcome, T), StateError> {
        let checkpoint = self.checkpoint(vehicle_id)?;
        let result = match self.do_action(action, vehicle_id, time, config) {
            Ok(outcome) => Ok((outcome, inspect(self))),
            Err(e) => Err(e),
        };
        self.restore(checkpoint)?;
        result
    }
}
