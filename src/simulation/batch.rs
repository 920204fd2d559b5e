//! Batch mode: independent replicas of one configuration run in parallel
//!
//! Replicas share only the immutable road network. Each owns its simulator
//! and its RNG, seeded from the base seed and the replica index.

use anyhow::Result;
use log::{error, info};
use rayon::prelude::*;
use std::sync::Arc;

use super::road_network::RoadNetwork;
use super::settings::SimulationSettings;
use super::simulator::Simulator;
use super::statistics::{aggregate, BatchStatistics, SimulationStatistics};

/// 64-bit fractional golden-ratio constant for seed mixing
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed of replica `index` derived from the batch's base seed
pub fn replica_seed(base_seed: u64, index: usize) -> u64 {
    base_seed ^ (index as u64).wrapping_mul(MIXING_CONSTANT)
}

/// Runs `settings.replicas` simulations in parallel and waits for all of
/// them. Fails if any replica failed; the others are unaffected by it.
pub fn run_batch(
    network: Arc<RoadNetwork>,
    settings: &SimulationSettings,
) -> Result<(BatchStatistics, Vec<SimulationStatistics>)> {
    settings.validate()?;
    info!(
        "Running {} replicas of {} ticks (traffic {}, craziness {})",
        settings.replicas, settings.ticks, settings.traffic, settings.craziness
    );

    let mut replica_settings = settings.clone();
    replica_settings.log_collisions = false;

    let outcomes: Vec<Result<SimulationStatistics>> = (0..settings.replicas)
        .into_par_iter()
        .map(|index| {
            let seed = replica_seed(settings.seed, index);
            let statistics = Simulator::new(Arc::clone(&network), replica_settings.clone(), seed)
                .and_then(|mut simulator| simulator.run());
            match &statistics {
                Ok(_) => info!("Replica {} finished", index),
                Err(err) => error!("Replica {} failed: {:#}", index, err),
            }
            statistics
        })
        .collect();

    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} replicas failed", failed, settings.replicas);
    }
    let replicas: Vec<SimulationStatistics> = outcomes.into_iter().collect::<Result<_>>()?;
    let batch = aggregate(&replicas)?;
    Ok((batch, replicas))
}
