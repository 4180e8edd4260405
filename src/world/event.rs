//! Timeline entries and what happens when each one is due.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Poisson;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::WorldError;
use super::World;
use crate::entities::Scooter;
use crate::policy::DecisionContext;
use crate::state::StateError;
use crate::units::travel_minutes;

/// A scheduled change to the world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Event {
    /// Draws the trips of the iteration starting at `time`.
    GenerateScooterTrips { time: f64 },
    /// A customer wants to rent a scooter in `departure_cluster_id`.
    ScooterDeparture {
        time: f64,
        departure_cluster_id: usize,
    },
    /// A rented scooter is parked at the end of its trip.
    ScooterArrival {
        time: f64,
        scooter: Scooter,
        arrival_cluster_id: usize,
        departure_cluster_id: usize,
        distance: f64,
    },
    /// A trip that found no usable scooter.
    LostTrip { time: f64 },
    /// A service vehicle reaches its next location and picks an action.
    VehicleArrival { time: f64, vehicle_id: usize },
}

impl Event {
    pub fn time(&self) -> f64 {
        match self {
            Event::GenerateScooterTrips { time }
            | Event::ScooterDeparture { time, .. }
            | Event::ScooterArrival { time, .. }
            | Event::LostTrip { time }
            | Event::VehicleArrival { time, .. } => *time,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::GenerateScooterTrips { .. } => "generate_scooter_trips",
            Event::ScooterDeparture { .. } => "scooter_departure",
            Event::ScooterArrival { .. } => "scooter_arrival",
            Event::LostTrip { .. } => "lost_trip",
            Event::VehicleArrival { .. } => "vehicle_arrival",
        }
    }

    /// Applies the event to `world`, then advances the world clock to the
    /// event time.
    ///
    /// Fails without touching the world if the event lies in the past.
    pub fn perform(self, world: &mut World) -> Result<(), WorldError> {
        let time = self.time();
        if time.is_nan() {
            return Err(WorldError::NaNTime);
        }
        if time < world.time {
            return Err(WorldError::TimeRegression {
                event_time: time,
                world_time: world.time,
            });
        }

        match self {
            Event::GenerateScooterTrips { time } => world.generate_scooter_trips(time)?,
            Event::ScooterDeparture {
                time,
                departure_cluster_id,
            } => world.scooter_departure(time, departure_cluster_id)?,
            Event::ScooterArrival {
                time,
                scooter,
                arrival_cluster_id,
                departure_cluster_id,
                distance,
            } => world.scooter_arrival(
                time,
                scooter,
                arrival_cluster_id,
                departure_cluster_id,
                distance,
            )?,
            Event::LostTrip { time } => world.lost_trip(time),
            Event::VehicleArrival { time, vehicle_id } => world.vehicle_arrival(time, vehicle_id)?,
        }

        world.time = time;
        Ok(())
    }
}

// =============================================================================
// Event handlers
// =============================================================================

impl World {
    fn generate_scooter_trips(&mut self, time: f64) -> Result<(), WorldError> {
        let iteration = self.config.iteration_length;
        let mut departures = Vec::new();
        for cluster in self.state.clusters() {
            let intensity = cluster.trip_intensity_per_iteration;
            if intensity <= 0.0 {
                continue;
            }
            let poisson = Poisson::new(intensity).map_err(|_| WorldError::InvalidTripIntensity {
                cluster_id: cluster.id,
                intensity,
            })?;
            let trips = poisson.sample(&mut self.rng) as usize;
            for _ in 0..trips {
                departures.push(Event::ScooterDeparture {
                    time: time + self.rng.gen::<f64>() * iteration,
                    departure_cluster_id: cluster.id,
                });
            }
        }

        trace!(time, trips = departures.len(), "generated scooter trips");
        for departure in departures {
            self.add_event(departure)?;
        }
        self.add_event(Event::GenerateScooterTrips {
            time: time + iteration,
        })?;
        self.metrics.record_sample(time, &self.state);
        Ok(())
    }

    fn scooter_departure(&mut self, time: f64, cluster_id: usize) -> Result<(), WorldError> {
        let battery_limit = self.config.battery_limit;
        let cluster = self.state.cluster(cluster_id)?;
        let Some(scooter_id) = cluster
            .scooters
            .iter()
            .find(|s| s.is_available(battery_limit))
            .map(|s| s.id)
        else {
            trace!(time, cluster = cluster_id, "no scooter available");
            return self.add_event(Event::LostTrip { time });
        };

        let leave = cluster.get_leave_distribution().map_err(StateError::from)?;
        // A lone cluster has nowhere to send trips; they end where they began.
        let arrival_cluster_id = match WeightedIndex::new(&leave) {
            Ok(destinations) => destinations.sample(&mut self.rng),
            Err(_) => cluster_id,
        };
        let destination = self.state.cluster(arrival_cluster_id)?.center;

        let scooter = self
            .state
            .cluster_mut(cluster_id)?
            .remove_scooter(scooter_id)
            .map_err(StateError::from)?;
        let distance = scooter
            .position
            .map(|p| p.distance_to(&destination))
            .unwrap_or(0.0);
        let arrival_time = time + travel_minutes(distance, self.config.scooter_speed_kmh);

        trace!(
            time,
            scooter = scooter_id,
            from = cluster_id,
            to = arrival_cluster_id,
            distance,
            "scooter departure"
        );
        self.metrics.trips += 1;
        self.add_event(Event::ScooterArrival {
            time: arrival_time,
            scooter,
            arrival_cluster_id,
            departure_cluster_id: cluster_id,
            distance,
        })
    }

    fn scooter_arrival(
        &mut self,
        time: f64,
        mut scooter: Scooter,
        arrival_cluster_id: usize,
        departure_cluster_id: usize,
        distance: f64,
    ) -> Result<(), WorldError> {
        scooter.travel(distance, self.config.battery_usage_per_km);
        trace!(
            time,
            scooter = scooter.id,
            cluster = arrival_cluster_id,
            battery = scooter.battery,
            "scooter arrival"
        );
        self.state
            .cluster_mut(arrival_cluster_id)?
            .add_scooter(scooter)
            .map_err(StateError::from)?;
        self.metrics
            .record_flow(departure_cluster_id, arrival_cluster_id);
        Ok(())
    }

    fn lost_trip(&mut self, time: f64) {
        trace!(time, "lost trip");
        self.add_reward(self.config.lost_trip_reward, time);
        self.metrics.lost_trips += 1;
    }

    fn vehicle_arrival(&mut self, time: f64, vehicle_id: usize) -> Result<(), WorldError> {
        let current = self.state.vehicle(vehicle_id)?.current_location;
        if let Some(pos) = self.tabu_list.iter().position(|&id| id == current) {
            self.tabu_list.remove(pos);
        }

        let action = {
            let mut ctx = DecisionContext {
                state: &mut self.state,
                tabu_list: &self.tabu_list,
                time,
                config: &self.config,
                rng: &mut self.rng,
            };
            self.policy.get_best_action(&mut ctx, vehicle_id)?
        };
        if self.tabu_list.contains(&action.next_location) {
            return Err(WorldError::TabuViolation {
                vehicle_id,
                location: action.next_location,
            });
        }

        let distance = self.state.get_distance(current, action.next_location)?;
        let action_time = action.get_action_time(distance, &self.config);
        let outcome = self.state.do_action(&action, vehicle_id, time, &self.config)?;

        if !self.state.is_depot(action.next_location) {
            self.tabu_list.push(action.next_location);
        }
        self.add_reward(outcome.reward, time);
        self.metrics.record_action(&action, distance, &outcome);

        debug!(
            time,
            vehicle = vehicle_id,
            location = current,
            %action,
            reward = outcome.reward,
            "vehicle arrival"
        );
        self.add_event(Event::VehicleArrival {
            time: time + action_time + outcome.wait_time,
            vehicle_id,
        })
    }
}
