//! Policy trait and implementations.
//!
//! A policy is asked for an [`Action`](crate::state::Action) every time a
//! vehicle arrives somewhere. Heuristic policies decide from the state
//! alone; [`ValueFunctionPolicy`] scores candidates with an injected
//! [`ValueFunction`].

pub mod do_nothing;
pub mod error;
pub mod random;
pub mod rebalancing;
pub mod replay;
pub mod swap_all;
pub mod trait_;
pub mod value_function;
pub mod value_guided;

pub use do_nothing::DoNothingPolicy;
pub use error::PolicyError;
pub use random::RandomActionPolicy;
pub use rebalancing::RebalancingPolicy;
pub use replay::ReplayPolicy;
pub use swap_all::SwapAllPolicy;
pub use trait_::{DecisionContext, Policy};
pub use value_function::{StateFeatures, ValueFunction};
pub use value_guided::ValueFunctionPolicy;
