use thiserror::Error;

use crate::entities::EntityError;

/// Errors raised while building or mutating a [`State`](super::State).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("Unknown location id: {0}")]
    UnknownLocation(usize),

    #[error("Unknown vehicle id: {0}")]
    UnknownVehicle(usize),

    #[error("Location {0} is not a cluster")]
    NotACluster(usize),

    #[error("Location at index {index} has id {id}; clusters must be numbered first, then depots")]
    LocationIdMismatch { index: usize, id: usize },

    #[error("Vehicle at index {index} has id {id}")]
    VehicleIdMismatch { index: usize, id: usize },

    #[error("Scooter id {0} appears more than once")]
    DuplicateScooterId(usize),

    #[error("Scooter, pick-up or delivery operations requested at depot {depot_id}")]
    OperationsAtDepot { depot_id: usize },
}
