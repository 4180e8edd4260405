//! Serialization boundary for simulation snapshots.
//!
//! A [`WorldSnapshot`] holds everything of a [`World`] except the policy
//! and the random generator. Snapshots go to and from bytes with
//! [`to_bytes`] / [`from_bytes`] and to disk with [`save`] / [`load`].
//! File names encode creation time, shift progress and fleet size so
//! snapshots sort and identify without being opened.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::policy::Policy;
use crate::state::State;
use crate::world::{EventQueue, ShiftMetrics, World};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializable image of a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: f64,
    pub shift_duration: f64,
    pub config: SimulationConfig,
    pub state: State,
    pub stack: EventQueue,
    pub tabu_list: Vec<usize>,
    pub total_reward: f64,
    pub metrics: ShiftMetrics,
}

impl WorldSnapshot {
    /// Scooters in clusters, on vehicles and on the road.
    pub fn total_scooters(&self) -> usize {
        self.state.total_scooters() + self.stack.scooters_in_flight()
    }
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time: self.time,
            shift_duration: self.shift_duration,
            config: self.config.clone(),
            state: self.state.clone(),
            stack: self.stack.clone(),
            tabu_list: self.tabu_list.clone(),
            total_reward: self.total_reward,
            metrics: self.metrics.clone(),
        }
    }

    /// Rebuilds a world from a snapshot, driven by `policy`.
    ///
    /// The random generator restarts from the configured seed mixed with
    /// the snapshot time, so a restored run does not replay the draws the
    /// original run made after the snapshot.
    pub fn restore(snapshot: WorldSnapshot, policy: Box<dyn Policy>) -> Self {
        let seed = snapshot.config.seed ^ snapshot.time.to_bits();
        Self {
            time: snapshot.time,
            shift_duration: snapshot.shift_duration,
            state: snapshot.state,
            tabu_list: snapshot.tabu_list,
            total_reward: snapshot.total_reward,
            metrics: snapshot.metrics,
            stack: snapshot.stack,
            rng: StdRng::seed_from_u64(seed),
            config: snapshot.config,
            policy,
        }
    }
}

pub fn to_bytes(snapshot: &WorldSnapshot) -> Result<Vec<u8>, PersistenceError> {
    Ok(serde_json::to_vec(snapshot)?)
}

pub fn from_bytes(bytes: &[u8]) -> Result<WorldSnapshot, PersistenceError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// File name of a snapshot created at `created_unix_secs`.
///
/// `world_<created>_<elapsed>-<total>min_<clusters>c_<scooters>s.json`
pub fn snapshot_file_name(snapshot: &WorldSnapshot, created_unix_secs: u64) -> String {
    format!(
        "world_{}_{:.0}-{:.0}min_{}c_{}s.json",
        created_unix_secs,
        snapshot.time,
        snapshot.shift_duration,
        snapshot.state.number_of_clusters(),
        snapshot.total_scooters()
    )
}

/// Writes a snapshot into `dir` and returns the path of the new file.
pub fn save(snapshot: &WorldSnapshot, dir: &Path) -> Result<PathBuf, PersistenceError> {
    let created = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(snapshot, created));
    fs::write(&path, to_bytes(snapshot)?)?;
    Ok(path)
}

pub fn load(path: &Path) -> Result<WorldSnapshot, PersistenceError> {
    from_bytes(&fs::read(path)?)
}
