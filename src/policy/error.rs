use thiserror::Error;

use crate::state::StateError;

/// Errors raised while a policy chooses an action.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("Value function used before setup(); call ValueFunction::setup with the initial state")]
    ValueFunctionNotSetUp,

    #[error("Feature vector has {found} entries, expected {expected}")]
    FeatureLength { expected: usize, found: usize },

    #[error("No candidate actions for vehicle {vehicle_id}")]
    NoCandidateActions { vehicle_id: usize },
}
