//! scootsim - discrete-event simulation of e-scooter fleet rebalancing
//!
//! Service vehicles swap batteries, pick up and drop off scooters across
//! geographic clusters while customers rent scooters according to Poisson
//! demand. A [`World`] runs one shift: it pops time-ordered events, lets a
//! pluggable [`Policy`] choose each vehicle's [`Action`] and accumulates
//! discounted rewards.
//!
//! ```no_run
//! use scootsim::{RebalancingPolicy, ScenarioBuilder, SimulationConfig, World};
//!
//! let config = SimulationConfig::default();
//! let state = ScenarioBuilder::new().clusters(8).build(&config)?;
//! let mut world = World::new(state, Box::new(RebalancingPolicy), config)?;
//! world.run()?;
//! println!("lost trips: {}", world.metrics.lost_trips);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod entities;
pub mod evaluation;
#[cfg(feature = "serde")]
pub mod persistence;
pub mod policy;
pub mod scenario;
pub mod state;
pub mod units;
pub mod world;

#[cfg(test)]
mod test_support;

pub use config::{ActionSpaceParams, ConfigError, GeoBound, SimulationConfig};
pub use evaluation::EvaluationMetrics;
pub use policy::{
    DecisionContext, DoNothingPolicy, Policy, PolicyError, RandomActionPolicy, RebalancingPolicy,
    ReplayPolicy, SwapAllPolicy, ValueFunction, ValueFunctionPolicy,
};
pub use scenario::ScenarioBuilder;
pub use state::{Action, State, StateError};
pub use units::{convert, SameDim};
pub use world::{Event, World, WorldError};
