use super::*;
use crate::config::{ConfigError, SimulationConfig};
use crate::policy::{
    DecisionContext, DoNothingPolicy, Policy, PolicyError, RebalancingPolicy, SwapAllPolicy,
};
use crate::state::Action;
use crate::test_support::small_state;

fn world_with(policy: impl Policy + 'static) -> World {
    let config = SimulationConfig::default();
    let state = small_state(&config);
    World::new(state, Box::new(policy), config).unwrap()
}

fn empty_world() -> World {
    let config = SimulationConfig::default();
    let state = small_state(&config);
    World::empty(state, Box::new(DoNothingPolicy), config)
}

/// Battery of every scooter, including those on a trip.
fn fleet_battery(world: &World) -> f64 {
    let in_flight: f64 = world
        .stack()
        .iter()
        .filter_map(|e| match e {
            Event::ScooterArrival { scooter, .. } => Some(scooter.battery),
            _ => None,
        })
        .sum();
    world.state.total_battery() + in_flight
}

/// Steps up to and including the next vehicle arrival.
fn step_to_next_vehicle_arrival(world: &mut World) {
    loop {
        let is_vehicle = matches!(world.stack().iter().next(), Some(Event::VehicleArrival { .. }));
        assert!(world.step().unwrap());
        if is_vehicle {
            break;
        }
    }
}

/// Always drives to location 1.
struct AlwaysToOne;

impl Policy for AlwaysToOne {
    fn get_best_action(
        &mut self,
        _: &mut DecisionContext<'_>,
        _: usize,
    ) -> Result<Action, PolicyError> {
        Ok(Action::relocate(1))
    }

    fn name(&self) -> &str {
        "always_to_one"
    }
}

mod scheduling {
    use super::*;

    #[test]
    fn new_world_seeds_vehicle_arrivals_and_trip_generation() {
        let world = world_with(DoNothingPolicy);
        let events: Vec<&Event> = world.stack().iter().collect();
        assert_eq!(
            events,
            vec![
                &Event::VehicleArrival {
                    time: 0.0,
                    vehicle_id: 0
                },
                &Event::GenerateScooterTrips { time: 0.0 },
            ]
        );
        assert_eq!(world.time, 0.0);
        assert_eq!(world.policy_name(), "do_nothing");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            iteration_length: 0.0,
            ..SimulationConfig::default()
        };
        let state = small_state(&config);
        let result = World::new(state, Box::new(DoNothingPolicy), config);
        assert!(matches!(result, Err(WorldError::Config(_))));
    }

    #[test]
    fn negative_costs_are_rejected_before_the_shift() {
        let config = SimulationConfig {
            battery_usage_per_km: -5.0,
            minutes_per_operation: -3.0,
            ..SimulationConfig::default()
        };
        let state = small_state(&config);
        let result = World::new(state, Box::new(RebalancingPolicy), config);
        assert!(matches!(
            result,
            Err(WorldError::Config(ConfigError::Negative { .. }))
        ));
    }

    #[test]
    fn add_event_orders_by_time() {
        let mut world = empty_world();
        for t in [30.0, 10.0, 20.0, 40.0] {
            world.add_event(Event::LostTrip { time: t }).unwrap();
        }
        let mut times = Vec::new();
        while let Some(t) = world.stack().peek_time() {
            times.push(t);
            world.step().unwrap();
        }
        assert_eq!(times, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(world.time, 40.0);
    }

    #[test]
    fn time_cannot_go_backwards() {
        let mut world = empty_world();
        world.perform(Event::LostTrip { time: 10.0 }).unwrap();
        let err = world.perform(Event::LostTrip { time: 5.0 }).unwrap_err();
        assert_eq!(
            err,
            WorldError::TimeRegression {
                event_time: 5.0,
                world_time: 10.0
            }
        );
        assert_eq!(world.time, 10.0);
        assert_eq!(world.metrics.lost_trips, 1);
    }

    #[test]
    fn equal_times_are_allowed() {
        let mut world = empty_world();
        world.perform(Event::LostTrip { time: 10.0 }).unwrap();
        world.perform(Event::LostTrip { time: 10.0 }).unwrap();
        assert_eq!(world.metrics.lost_trips, 2);
    }

    #[test]
    fn step_on_empty_queue_reports_false() {
        let mut world = empty_world();
        assert!(!world.step().unwrap());
    }
}

mod trips {
    use super::*;

    #[test]
    fn trip_generation_schedules_departures_within_iteration() {
        let mut world = empty_world();
        world
            .perform(Event::GenerateScooterTrips { time: 0.0 })
            .unwrap();

        let iteration = world.config().iteration_length;
        let mut generations = 0;
        for event in world.stack().iter() {
            match event {
                Event::ScooterDeparture { time, .. } => {
                    assert!((0.0..iteration).contains(time));
                }
                Event::GenerateScooterTrips { time } => {
                    generations += 1;
                    assert_eq!(*time, iteration);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(generations, 1);
        assert_eq!(world.metrics.timeline.len(), 1);
    }

    #[test]
    fn departure_without_usable_scooter_is_lost() {
        let mut world = empty_world();
        world.state.cluster_mut(2).unwrap().scooters[0].battery = 10.0;

        world
            .perform(Event::ScooterDeparture {
                time: 1.0,
                departure_cluster_id: 2,
            })
            .unwrap();

        let events: Vec<&Event> = world.stack().iter().collect();
        assert_eq!(events, vec![&Event::LostTrip { time: 1.0 }]);
        assert_eq!(world.state.cluster(2).unwrap().number_of_scooters(), 1);

        world.step().unwrap();
        assert_eq!(world.metrics.lost_trips, 1);
        let expected = world.config().lost_trip_reward * world.config().discount(1.0);
        assert!((world.total_reward - expected).abs() < 1e-12);
    }

    #[test]
    fn departure_and_arrival_move_one_scooter() {
        let mut world = empty_world();
        let total = world.total_scooters();

        world
            .perform(Event::ScooterDeparture {
                time: 2.0,
                departure_cluster_id: 1,
            })
            .unwrap();
        assert_eq!(world.metrics.trips, 1);
        assert_eq!(world.state.cluster(1).unwrap().number_of_scooters(), 7);
        assert_eq!(world.total_scooters(), total);

        let Some(Event::ScooterArrival {
            time,
            scooter,
            arrival_cluster_id,
            departure_cluster_id,
            distance,
        }) = world.stack().iter().next().cloned()
        else {
            panic!("expected a scooter arrival");
        };
        // lowest-index scooter above the battery limit: id 7 at 30 %
        assert_eq!(scooter.id, 7);
        assert_eq!(departure_cluster_id, 1);
        assert_ne!(arrival_cluster_id, 1);
        assert!(time > 2.0);

        world.step().unwrap();
        let cluster = world.state.cluster(arrival_cluster_id).unwrap();
        let parked = cluster.get_scooter(7).unwrap();
        assert!((parked.battery - (30.0 - distance * 5.0)).abs() < 1e-9);
        assert_eq!(parked.position, Some(cluster.center));
        assert_eq!(world.metrics.flows[1][arrival_cluster_id], 1);
        assert_eq!(world.total_scooters(), total);
    }

    #[test]
    fn lone_cluster_trips_stay_home() {
        use crate::entities::{Depot, Vehicle};
        use crate::state::State;
        use crate::test_support::{cluster, point};

        let config = SimulationConfig::default();
        let clusters = vec![cluster(0, &[90.0, 90.0], 0)
            .with_ideal_state(2)
            .with_trip_intensity(1.0)
            .with_move_probabilities(vec![1.0])];
        let depots = vec![Depot::main(1, point(1), 100.0)];
        let vehicles = vec![Vehicle::new(0, 0, 10, 5)];
        let state = State::new(clusters, depots, vehicles).unwrap();
        let mut world = World::empty(state, Box::new(DoNothingPolicy), config);

        world
            .perform(Event::ScooterDeparture {
                time: 0.0,
                departure_cluster_id: 0,
            })
            .unwrap();
        world.step().unwrap();
        assert_eq!(world.state.cluster(0).unwrap().number_of_scooters(), 2);
        assert_eq!(world.metrics.flows[0][0], 1);
    }
}

mod vehicles {
    use super::*;

    #[test]
    fn next_location_is_tabu_until_vehicle_leaves() {
        let mut world = world_with(DoNothingPolicy);
        step_to_next_vehicle_arrival(&mut world);
        let first = world.state.vehicles[0].current_location;
        assert_eq!(world.tabu_list, vec![first]);

        step_to_next_vehicle_arrival(&mut world);
        let second = world.state.vehicles[0].current_location;
        assert_ne!(second, first);
        assert!(!world.tabu_list.contains(&first));
        if world.state.is_depot(second) {
            assert!(world.tabu_list.is_empty());
        } else {
            assert_eq!(world.tabu_list, vec![second]);
        }
    }

    #[test]
    fn arrival_reschedules_after_action_time() {
        let mut world = world_with(SwapAllPolicy);
        step_to_next_vehicle_arrival(&mut world);

        let next = world.state.vehicles[0].current_location;
        let swaps = world.metrics.battery_swaps;
        assert_eq!(swaps, 5);
        let distance = world.state.get_distance(0, next).unwrap();
        let config = world.config();
        let expected = swaps as f64 * config.minutes_per_operation
            + config.minutes_constant_per_action
            + distance / config.vehicle_speed_kmh * 60.0;

        let arrival = world
            .stack()
            .iter()
            .find_map(|e| match e {
                Event::VehicleArrival { time, .. } => Some(*time),
                _ => None,
            })
            .unwrap();
        assert!((arrival - expected).abs() < 1e-9);
    }

    #[test]
    fn depot_refill_delays_next_arrival() {
        let mut world = empty_world();
        world.state.vehicles[0].current_location = 3;
        world.state.vehicles[0].battery_inventory = 10;
        world
            .perform(Event::VehicleArrival {
                time: 0.0,
                vehicle_id: 0,
            })
            .unwrap();

        let vehicle = &world.state.vehicles[0];
        assert_eq!(vehicle.battery_inventory, 50);
        let distance = world.state.get_distance(3, vehicle.current_location).unwrap();
        let travel = Action::relocate(vehicle.current_location)
            .get_action_time(distance, world.config());
        let wait = 40.0 * world.config().swap_time_per_battery;

        assert_eq!(
            world.stack().peek_time(),
            Some(travel + wait),
            "refill wait is added to the travel time"
        );
        assert_eq!(world.metrics.batteries_refilled, 40);
        // depots never enter the tabu list
        assert!(!world.tabu_list.contains(&3));
    }

    #[test]
    fn sending_two_vehicles_to_one_cluster_is_rejected() {
        let config = SimulationConfig::default();
        let mut state = small_state(&config);
        state.vehicles.push(crate::entities::Vehicle::new(1, 2, 50, 20));
        let mut world = World::new(state, Box::new(AlwaysToOne), config).unwrap();

        assert!(world.step().unwrap());
        assert_eq!(world.tabu_list, vec![1]);
        assert_eq!(
            world.step(),
            Err(WorldError::TabuViolation {
                vehicle_id: 1,
                location: 1
            })
        );
    }
}

mod shift {
    use super::*;

    #[test]
    fn scooters_are_conserved() {
        let mut world = world_with(RebalancingPolicy);
        let total = world.total_scooters();
        while world.time < world.shift_duration {
            assert!(world.step().unwrap());
            assert_eq!(world.total_scooters(), total, "at t = {}", world.time);
        }
    }

    #[test]
    fn battery_only_decreases_without_swaps() {
        let mut world = world_with(DoNothingPolicy);
        let mut battery = fleet_battery(&world);
        while world.time < world.shift_duration {
            world.step().unwrap();
            let now = fleet_battery(&world);
            assert!(now <= battery + 1e-9, "battery grew at t = {}", world.time);
            battery = now;
        }
        assert_eq!(world.metrics.battery_swaps, 0);
    }

    #[test]
    fn full_shift_runs_to_the_end() {
        let mut world = world_with(RebalancingPolicy);
        world.run().unwrap();

        assert!(world.is_finished());
        assert!(world.metrics.vehicle_arrivals > 1);
        // one sample per started iteration
        assert!(world.metrics.timeline.len() >= 24);
        assert_eq!(
            world.metrics.completed_trips() + world.stack().scooters_in_flight(),
            world.metrics.trips
        );
    }

    #[test]
    fn same_seed_same_shift() {
        let mut a = world_with(RebalancingPolicy);
        let mut b = world_with(RebalancingPolicy);
        a.run().unwrap();
        b.run().unwrap();
        assert_eq!(a.total_reward, b.total_reward);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.state, b.state);
    }
}
