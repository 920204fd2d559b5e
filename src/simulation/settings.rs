//! Run configuration

use anyhow::Result;
use std::path::PathBuf;

/// Number of replicas a batch runs unless told otherwise
pub const DEFAULT_REPLICAS: usize = 40;

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Tick horizon of one run
    pub ticks: u32,
    /// Spawn rate; a spawn trial succeeds with probability `traffic / 10`
    pub traffic: f32,
    /// Centre of the drivers' madness distribution, in [0, 1]
    pub craziness: f32,
    pub batch_mode: bool,
    pub replicas: usize,
    /// Base seed; replicas derive their own seeds from it
    pub seed: u64,
    pub network_file: PathBuf,
    /// Log every newly detected collision
    pub log_collisions: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            ticks: 5000,
            traffic: 0.01,
            craziness: 0.5,
            batch_mode: false,
            replicas: DEFAULT_REPLICAS,
            seed: 0,
            network_file: PathBuf::new(),
            log_collisions: true,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.traffic) {
            anyhow::bail!("Traffic must be within [0, 10], got {}", self.traffic);
        }
        if !(0.0..=1.0).contains(&self.craziness) {
            anyhow::bail!("Craziness must be within [0, 1], got {}", self.craziness);
        }
        if self.batch_mode && self.replicas == 0 {
            anyhow::bail!("Batch mode needs at least one replica");
        }
        Ok(())
    }
}
