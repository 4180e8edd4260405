//! Configuration for a rebalancing shift.
//!
//! One [`SimulationConfig`] is created per run and never mutated afterwards;
//! it is threaded through the world, the state operations and the policies.

use qtty::{Minute, Quantity};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units::{to_minutes, SameDim};

/// Errors raised by [`SimulationConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("discount rate must lie in (0, 1], got {0}")]
    DiscountRate(f64),

    #[error("geographic bound is inverted: {0:?}")]
    InvertedBound(GeoBound),

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("battery limit must lie in [0, 100], got {0}")]
    BatteryLimit(f64),

    #[error("low battery fraction must lie in [0, 1], got {0}")]
    LowBatteryFraction(f64),
}

/// Rectangular latitude/longitude box that scooter coordinates are clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoBound {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBound {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    fn is_valid(&self) -> bool {
        self.lat_min < self.lat_max && self.lon_min < self.lon_max
    }
}

impl Default for GeoBound {
    /// Central Oslo.
    fn default() -> Self {
        Self::new(59.9040, 59.9547, 10.6478, 10.8095)
    }
}

/// Parameters controlling how large the per-arrival action space is.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionSpaceParams {
    /// Number of best-ranked neighbour clusters considered as next destination.
    pub number_of_neighbours: usize,
    /// Thins each operation-count range to roughly this many values.
    pub divide: Option<usize>,
    /// Extra uniformly drawn neighbours appended for exploration.
    pub random_neighbours: usize,
}

impl Default for ActionSpaceParams {
    fn default() -> Self {
        Self {
            number_of_neighbours: 3,
            divide: None,
            random_neighbours: 1,
        }
    }
}

/// Configuration for a single simulated shift.
///
/// All durations are in minutes, distances in kilometres, batteries in percent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    // --- Clock ---
    /// Length of the shift.
    pub shift_duration: f64,
    /// Trip-generation period.
    pub iteration_length: f64,

    // --- Movement ---
    pub vehicle_speed_kmh: f64,
    pub scooter_speed_kmh: f64,
    /// Handling time for each swap, pick-up or delivery.
    pub minutes_per_operation: f64,
    /// Fixed overhead added to every action (parking, loading).
    pub minutes_constant_per_action: f64,

    // --- Batteries ---
    /// Scooters below this battery level cannot be rented.
    pub battery_limit: f64,
    /// Battery percentage points consumed per kilometre ridden.
    pub battery_usage_per_km: f64,

    // --- Rewards ---
    /// Per-iteration discount applied to rewards.
    pub discount_rate: f64,
    pub lost_trip_reward: f64,
    pub delivery_reward: f64,

    // --- Depots ---
    /// Vehicle time spent per battery refilled at a depot.
    pub swap_time_per_battery: f64,
    /// Time a small depot needs to recharge one battery.
    pub charge_time_per_battery: f64,
    pub main_depot_capacity: f64,
    pub small_depot_capacity: f64,

    // --- Vehicles ---
    pub vehicle_battery_capacity: usize,
    pub vehicle_scooter_capacity: usize,
    /// Depots become candidates once the battery inventory drops to this share.
    pub low_battery_fraction: f64,

    // --- Neighbour ranking ---
    pub neighbour_distance_weight: f64,
    pub neighbour_need_weight: f64,
    pub action_space: ActionSpaceParams,

    pub geo_bound: GeoBound,
    /// Seed of the run's single random generator.
    pub seed: u64,
}

impl SimulationConfig {
    /// Sets the shift length from any time quantity.
    pub fn with_shift_duration<U: SameDim<Minute>>(mut self, duration: Quantity<U>) -> Self {
        self.shift_duration = to_minutes(duration);
        self
    }

    /// Sets the trip-generation period from any time quantity.
    pub fn with_iteration_length<U: SameDim<Minute>>(mut self, length: Quantity<U>) -> Self {
        self.iteration_length = to_minutes(length);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_action_space(mut self, action_space: ActionSpaceParams) -> Self {
        self.action_space = action_space;
        self
    }

    /// Discount factor for a reward earned at `time`.
    pub fn discount(&self, time: f64) -> f64 {
        self.discount_rate.powf(time / self.iteration_length)
    }

    /// Battery inventory at or below which depots are offered as destinations.
    pub fn low_battery_threshold(&self) -> usize {
        (self.vehicle_battery_capacity as f64 * self.low_battery_fraction).ceil() as usize
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("shift_duration", self.shift_duration),
            ("iteration_length", self.iteration_length),
            ("vehicle_speed_kmh", self.vehicle_speed_kmh),
            ("scooter_speed_kmh", self.scooter_speed_kmh),
            ("charge_time_per_battery", self.charge_time_per_battery),
            ("minutes_constant_per_action", self.minutes_constant_per_action),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        let non_negative = [
            ("minutes_per_operation", self.minutes_per_operation),
            ("battery_usage_per_km", self.battery_usage_per_km),
            ("swap_time_per_battery", self.swap_time_per_battery),
            ("main_depot_capacity", self.main_depot_capacity),
            ("small_depot_capacity", self.small_depot_capacity),
            ("neighbour_distance_weight", self.neighbour_distance_weight),
            ("neighbour_need_weight", self.neighbour_need_weight),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if !(self.discount_rate > 0.0 && self.discount_rate <= 1.0) {
            return Err(ConfigError::DiscountRate(self.discount_rate));
        }
        if !(0.0..=100.0).contains(&self.battery_limit) {
            return Err(ConfigError::BatteryLimit(self.battery_limit));
        }
        if !(0.0..=1.0).contains(&self.low_battery_fraction) {
            return Err(ConfigError::LowBatteryFraction(self.low_battery_fraction));
        }
        if !self.geo_bound.is_valid() {
            return Err(ConfigError::InvertedBound(self.geo_bound));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shift_duration: 480.0,
            iteration_length: 20.0,
            vehicle_speed_kmh: 30.0,
            scooter_speed_kmh: 7.0,
            minutes_per_operation: 1.5,
            minutes_constant_per_action: 5.0,
            battery_limit: 20.0,
            battery_usage_per_km: 5.0,
            discount_rate: 0.9,
            lost_trip_reward: -0.1,
            delivery_reward: 1.0,
            swap_time_per_battery: 0.4,
            charge_time_per_battery: 60.0,
            main_depot_capacity: 10_000.0,
            small_depot_capacity: 100.0,
            vehicle_battery_capacity: 50,
            vehicle_scooter_capacity: 20,
            low_battery_fraction: 0.1,
            neighbour_distance_weight: 0.5,
            neighbour_need_weight: 0.5,
            action_space: ActionSpaceParams::default(),
            geo_bound: GeoBound::default(),
            seed: 42,
        }
    }
}
