//! Evaluation of policies over several independent shifts.
//!
//! Every run gets its own seed, a freshly generated [`State`] and a fresh
//! policy, so runs share nothing.
//!
//! [`State`]: crate::state::State

use std::fmt;

use tracing::info;

use crate::config::SimulationConfig;
use crate::policy::Policy;
use crate::scenario::ScenarioBuilder;
use crate::world::{World, WorldError};

/// Aggregated metrics over several shifts.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub policy: String,
    /// Number of shifts evaluated.
    pub n_runs: usize,
    /// Mean discounted reward per shift.
    pub mean_reward: f64,
    /// Standard deviation of the discounted reward.
    pub std_reward: f64,
    pub mean_trips: f64,
    pub mean_lost_trips: f64,
    /// Mean share of requested trips that were lost, in percent.
    pub mean_pct_lost: f64,
    /// Mean battery deficiency over clusters at the end of the shift.
    pub mean_final_deficiency: f64,
    /// Mean total deviation from ideal state at the end of the shift.
    pub mean_final_deviation: f64,
}

struct RunStats {
    reward: f64,
    trips: usize,
    lost_trips: usize,
    lost_ratio: f64,
    deficiency: f64,
    deviation: usize,
}

impl EvaluationMetrics {
    /// Runs one shift per seed and aggregates the results.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Generator of the initial state; its seed is replaced per run
    /// * `config` - Shift configuration; its seed is replaced per run
    /// * `seeds` - One seed per run
    /// * `make_policy` - Builds the policy of each run
    pub fn evaluate<F>(
        scenario: &ScenarioBuilder,
        config: &SimulationConfig,
        seeds: &[u64],
        mut make_policy: F,
    ) -> Result<Self, WorldError>
    where
        F: FnMut() -> Box<dyn Policy>,
    {
        let mut runs = Vec::with_capacity(seeds.len());
        let mut policy_name = String::new();

        for &seed in seeds {
            let config = config.clone().with_seed(seed);
            let state = scenario.clone().seed(seed).build(&config)?;
            let mut world = World::new(state, make_policy(), config)?;
            policy_name = world.policy_name().to_string();
            world.run()?;

            runs.push(RunStats {
                reward: world.total_reward,
                trips: world.metrics.trips,
                lost_trips: world.metrics.lost_trips,
                lost_ratio: world.metrics.lost_trip_ratio(),
                deficiency: world.state.clusters().map(|c| c.battery_deficiency()).sum(),
                deviation: world.state.total_deviation_from_ideal_state(),
            });
        }

        let n = runs.len().max(1) as f64;
        let mean = |f: &dyn Fn(&RunStats) -> f64| runs.iter().map(f).sum::<f64>() / n;
        let mean_reward = mean(&|r| r.reward);
        let std_reward = mean(&|r| (r.reward - mean_reward).powi(2)).sqrt();

        let metrics = Self {
            policy: policy_name,
            n_runs: runs.len(),
            mean_reward,
            std_reward,
            mean_trips: mean(&|r| r.trips as f64),
            mean_lost_trips: mean(&|r| r.lost_trips as f64),
            mean_pct_lost: mean(&|r| r.lost_ratio * 100.0),
            mean_final_deficiency: mean(&|r| r.deficiency),
            mean_final_deviation: mean(&|r| r.deviation as f64),
        };
        info!(
            policy = %metrics.policy,
            runs = metrics.n_runs,
            mean_reward = metrics.mean_reward,
            "evaluation finished"
        );
        Ok(metrics)
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} ({} shifts) ===",
            self.policy, self.n_runs
        )?;
        writeln!(
            f,
            "  Mean reward:             {:.3} (std {:.3})",
            self.mean_reward, self.std_reward
        )?;
        writeln!(f, "  Mean trips:              {:.1}", self.mean_trips)?;
        writeln!(f, "  Mean lost trips:         {:.1}", self.mean_lost_trips)?;
        writeln!(f, "  Mean % lost:             {:.1}%", self.mean_pct_lost)?;
        writeln!(
            f,
            "  Mean final deficiency:   {:.2}",
            self.mean_final_deficiency
        )?;
        writeln!(
            f,
            "  Mean final deviation:    {:.1}",
            self.mean_final_deviation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DoNothingPolicy, RebalancingPolicy};

    fn scenario() -> ScenarioBuilder {
        ScenarioBuilder::new().clusters(5).vehicles(1)
    }

    fn short_shift() -> SimulationConfig {
        SimulationConfig {
            shift_duration: 120.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn evaluate_completes() {
        let metrics = EvaluationMetrics::evaluate(&scenario(), &short_shift(), &[1, 2, 3], || {
            Box::new(RebalancingPolicy)
        })
        .unwrap();
        assert_eq!(metrics.n_runs, 3);
        assert_eq!(metrics.policy, "rebalancing");
        assert!(metrics.std_reward >= 0.0);
        assert!((0.0..=100.0).contains(&metrics.mean_pct_lost));
    }

    #[test]
    fn evaluation_is_reproducible() {
        let run = || {
            EvaluationMetrics::evaluate(&scenario(), &short_shift(), &[4, 5], || {
                Box::new(DoNothingPolicy)
            })
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn display_names_policy() {
        let metrics = EvaluationMetrics::evaluate(&scenario(), &short_shift(), &[9], || {
            Box::new(DoNothingPolicy)
        })
        .unwrap();
        let text = metrics.to_string();
        assert!(text.starts_with("=== do_nothing (1 shifts) ==="));
        assert!(text.contains("Mean lost trips"));
    }
}
