//! Discrete-event simulation of one shift.
//!
//! A [`World`] owns the [`State`], the time-ordered [`EventQueue`] and the
//! active [`Policy`]. [`World::run`] pops the earliest event and performs it
//! until the clock passes the end of the shift. Performing an event may
//! schedule further events; vehicle arrivals always schedule their successor
//! and trip generation reschedules itself every iteration.
//!
//! The run is single-threaded. One seeded [`StdRng`] drives every random
//! draw, so a run is reproducible from its configuration.

pub mod error;
pub mod event;
pub mod metrics;
pub mod queue;

#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument};

use crate::config::SimulationConfig;
use crate::policy::Policy;
use crate::state::State;

pub use error::WorldError;
pub use event::Event;
pub use metrics::{MetricsSample, ShiftMetrics};
pub use queue::{EventQueue, F64Key};

/// The run-level aggregate of one simulated shift.
pub struct World {
    /// Simulation clock in minutes. Never decreases.
    pub time: f64,
    pub shift_duration: f64,
    pub state: State,
    /// Location ids no vehicle may be sent to until the vehicle there leaves.
    pub tabu_list: Vec<usize>,
    /// Sum of discounted rewards so far.
    pub total_reward: f64,
    pub metrics: ShiftMetrics,
    pub(crate) stack: EventQueue,
    pub(crate) config: SimulationConfig,
    pub(crate) policy: Box<dyn Policy>,
    pub(crate) rng: StdRng,
}

impl World {
    /// Creates a world at time zero.
    ///
    /// Every vehicle gets an arrival at time zero at its start location and
    /// trip generation starts with the first iteration.
    pub fn new(
        state: State,
        policy: Box<dyn Policy>,
        config: SimulationConfig,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let mut world = Self::empty(state, policy, config);
        for vehicle_id in 0..world.state.vehicles.len() {
            world.add_event(Event::VehicleArrival {
                time: 0.0,
                vehicle_id,
            })?;
        }
        world.add_event(Event::GenerateScooterTrips { time: 0.0 })?;
        Ok(world)
    }

    /// A world with an empty queue.
    pub(crate) fn empty(state: State, policy: Box<dyn Policy>, config: SimulationConfig) -> Self {
        Self {
            time: 0.0,
            shift_duration: config.shift_duration,
            metrics: ShiftMetrics::new(state.number_of_clusters()),
            state,
            tabu_list: Vec::new(),
            total_reward: 0.0,
            stack: EventQueue::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            policy,
        }
    }

    /// Runs the shift to its end.
    ///
    /// Stops at the first failing event and returns its error. That event is
    /// consumed and handlers it already ran are not undone, so the results
    /// of a failed run should be discarded.
    #[instrument(skip_all, fields(policy = self.policy.name(), shift = self.shift_duration))]
    pub fn run(&mut self) -> Result<(), WorldError> {
        info!(
            vehicles = self.state.vehicles.len(),
            clusters = self.state.number_of_clusters(),
            scooters = self.total_scooters(),
            "shift started"
        );
        while self.time < self.shift_duration {
            if !self.step()? {
                break;
            }
        }
        info!(
            reward = self.total_reward,
            trips = self.metrics.trips,
            lost_trips = self.metrics.lost_trips,
            deliveries = self.metrics.deliveries,
            battery_swaps = self.metrics.battery_swaps,
            "shift finished"
        );
        Ok(())
    }

    /// Performs the earliest pending event. Returns `false` if none is left.
    pub fn step(&mut self) -> Result<bool, WorldError> {
        match self.stack.pop() {
            Some(event) => {
                event.perform(self)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Performs `event` immediately, regardless of the queue.
    pub fn perform(&mut self, event: Event) -> Result<(), WorldError> {
        event.perform(self)
    }

    /// Schedules an event. Events with equal times run in insertion order.
    pub fn add_event(&mut self, event: Event) -> Result<(), WorldError> {
        self.stack.push(event)
    }

    pub fn stack(&self) -> &EventQueue {
        &self.stack
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Adds `reward`, discounted to the start of the shift.
    pub fn add_reward(&mut self, reward: f64, time: f64) {
        self.total_reward += reward * self.config.discount(time);
    }

    /// Scooters in clusters, on vehicles and on the road.
    pub fn total_scooters(&self) -> usize {
        self.state.total_scooters() + self.stack.scooters_in_flight()
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.shift_duration
    }
}
