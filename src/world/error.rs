use thiserror::Error;

use crate::config::ConfigError;
use crate::policy::PolicyError;
use crate::state::StateError;

/// Errors that abort a simulated shift.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    #[error("Event at time {event_time} is earlier than world time {world_time}")]
    TimeRegression { event_time: f64, world_time: f64 },

    #[error("Event time cannot be NaN")]
    NaNTime,

    #[error("Trip intensity {intensity} of cluster {cluster_id} is not a valid Poisson rate")]
    InvalidTripIntensity { cluster_id: usize, intensity: f64 },

    #[error("Vehicle {vehicle_id} was sent to tabu location {location}")]
    TabuViolation { vehicle_id: usize, location: usize },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
