// Demonstration: simulate rebalancing shifts and compare policies.
//
// Build/run from this repo root:
//   RUST_LOG=scootsim=info cargo run --example shift_demo -- --policy rebalancing --shifts 5

use std::env;

use qtty::{Hour, Minute, Quantity};
use tracing_subscriber::EnvFilter;

use scootsim::policy::StateFeatures;
use scootsim::{
    DoNothingPolicy, EvaluationMetrics, Policy, PolicyError, RandomActionPolicy,
    RebalancingPolicy, ScenarioBuilder, SimulationConfig, State, SwapAllPolicy, ValueFunction,
    ValueFunctionPolicy,
};

/// Fixed-weight scorer: fewer scooters out of place and fuller batteries are better.
struct ImbalanceValue {
    encoder: Option<StateFeatures>,
}

impl ValueFunction for ImbalanceValue {
    fn setup(&mut self, state: &State) {
        self.encoder = Some(StateFeatures::for_state(state));
    }

    fn estimate_value_from_state_features(&self, features: &[f64]) -> Result<f64, PolicyError> {
        let encoder = self.encoder.ok_or(PolicyError::ValueFunctionNotSetUp)?;
        let clusters = encoder.n_clusters() * StateFeatures::CLUSTER_FEATURE_DIM;
        let value = features[..clusters.min(features.len())]
            .chunks(StateFeatures::CLUSTER_FEATURE_DIM)
            .map(|c| -c[0].abs() - 0.5 * c.get(1).copied().unwrap_or_default())
            .sum();
        Ok(value)
    }

    fn get_state_features(
        &self,
        state: &State,
        vehicle_id: usize,
        time: f64,
    ) -> Result<Vec<f64>, PolicyError> {
        self.encoder
            .ok_or(PolicyError::ValueFunctionNotSetUp)?
            .build(state, vehicle_id, time)
    }

    fn update_weights(&mut self, _: &[f64], _: f64, _: f64, _: f64) -> Result<(), PolicyError> {
        Ok(())
    }
}

fn make_policy(name: &str, scenario: &ScenarioBuilder, config: &SimulationConfig) -> Box<dyn Policy> {
    match name {
        "do_nothing" => Box::new(DoNothingPolicy),
        "swap_all" => Box::new(SwapAllPolicy),
        "random" => Box::new(RandomActionPolicy),
        "value" => {
            let mut vf = ImbalanceValue { encoder: None };
            if let Ok(state) = scenario.build(config) {
                vf.setup(&state);
            }
            Box::new(ValueFunctionPolicy::new(Box::new(vf)).with_epsilon(0.05))
        }
        _ => Box::new(RebalancingPolicy),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    let policy_name = arg_value(&args, "--policy").unwrap_or("all");
    let shifts: u64 = arg_value(&args, "--shifts")
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    let clusters: usize = arg_value(&args, "--clusters")
        .and_then(|s| s.parse().ok())
        .unwrap_or(12);

    let config = SimulationConfig::default()
        .with_shift_duration(Quantity::<Hour>::new(8.0))
        .with_iteration_length(Quantity::<Minute>::new(20.0));
    let scenario = ScenarioBuilder::new().clusters(clusters).vehicles(2);
    let seeds: Vec<u64> = (0..shifts).collect();

    let names: Vec<&str> = match policy_name {
        "all" => vec!["do_nothing", "swap_all", "random", "rebalancing", "value"],
        "do_nothing" | "swap_all" | "random" | "rebalancing" | "value" => vec![policy_name],
        other => {
            eprintln!(
                "Unknown --policy '{}'; expected all, do_nothing, swap_all, random, rebalancing or value.",
                other
            );
            std::process::exit(2);
        }
    };

    for name in names {
        let result = EvaluationMetrics::evaluate(&scenario, &config, &seeds, || {
            make_policy(name, &scenario, &config)
        });
        match result {
            Ok(metrics) => println!("{}", metrics),
            Err(e) => {
                eprintln!("Shift aborted under policy '{}': {}", name, e);
                std::process::exit(1);
            }
        }
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
