//! Agent spawning
//!
//! Each tick one Bernoulli trial decides whether a new agent appears. Its
//! driver and vehicle parameters are drawn from the simulation's own RNG.

use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::agent::{Agent, DriverProfile, VehicleProfile};
use super::road_network::RoadNetwork;
use super::settings::SimulationSettings;
use super::types::AgentId;

pub const VEHICLE_ACCELERATION: f32 = 0.01;
pub const VEHICLE_DECELERATION: f32 = 0.1;
pub const VEHICLE_LENGTH: f32 = 0.8;

/// Probability of a spawn attempt succeeding in one tick
pub fn spawn_probability(traffic: f32) -> f32 {
    traffic / 10.0
}

/// Runs this tick's spawn trial.
///
/// Returns the new agent, or `None` when the trial fails. Route generation
/// errors are propagated: they mean the network is misconfigured.
pub fn spawn_agent<R: Rng + ?Sized>(
    id: AgentId,
    settings: &SimulationSettings,
    network: &RoadNetwork,
    rng: &mut R,
) -> Result<Option<Agent>> {
    if rng.random::<f32>() >= spawn_probability(settings.traffic) {
        return Ok(None);
    }

    let max_velocity = rng.random::<f32>() / 8.0 + 0.1;
    let madness = madness_factor(settings.craziness, rng)?;
    let driver = DriverProfile {
        safe_distance_moving: rng.random::<f32>() * 0.2 + 0.3 - madness * 0.2,
        safe_distance_stationary: 1.15 - madness * 0.2,
        madness,
    };
    let vehicle = VehicleProfile {
        acceleration: VEHICLE_ACCELERATION,
        deceleration: VEHICLE_DECELERATION,
        max_velocity,
        length: VEHICLE_LENGTH,
    };
    let route = network.random_route(rng)?;

    Ok(Some(Agent::new(id, driver, vehicle, route)))
}

/// Gaussian around `craziness` with deviation 0.5, redrawn until in [0, 1].
/// Fails when `craziness` itself lies outside [0, 1].
pub fn madness_factor<R: Rng + ?Sized>(craziness: f32, rng: &mut R) -> Result<f32> {
    if !(0.0..=1.0).contains(&craziness) {
        anyhow::bail!("Craziness must be within [0, 1], got {}", craziness);
    }
    let normal = Normal::new(craziness, 0.5)
        .with_context(|| format!("Invalid madness distribution around {}", craziness))?;
    loop {
        let value = normal.sample(rng);
        if (0.0..=1.0).contains(&value) {
            return Ok(value);
        }
    }
}
