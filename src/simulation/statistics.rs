//! Statistics collection for single runs and batches

use anyhow::Result;
use log::info;
use ordered_float::OrderedFloat;
use sorted_vec::SortedVec;
use std::collections::BTreeMap;

use super::agent::Agent;
use super::agent_state::AgentState;
use super::road_network::RoadNetwork;
use super::types::AgentId;

/// Route key: (origin id, destination id) from the network description
pub type RouteKey = (u32, u32);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteStatistics {
    /// Mean over arrived agents of each agent's mean velocity
    pub average_velocity: f32,
    pub agents: f32,
}

/// Results of one simulation run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationStatistics {
    /// Mean over all velocity samples of all agents
    pub average_velocity: f32,
    /// Mean ticks an agent spent queued before admission
    pub average_waiting_time: f32,
    /// Mean ticks an agent spent on the network
    pub average_driving_time: f32,
    /// Mean number of queued agents per tick
    pub average_queue_length: f32,
    pub collisions: usize,
    pub agents: usize,
    pub ticks: u32,
    pub routes: BTreeMap<RouteKey, RouteStatistics>,
}

impl SimulationStatistics {
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Average velocity: {}", self.average_velocity);
        info!("Average waiting time: {}", self.average_waiting_time);
        info!("Average driving time: {}", self.average_driving_time);
        info!("Average queue length: {}", self.average_queue_length);
        info!("Number of collisions: {}", self.collisions);
        info!("Number of agents: {}", self.agents);
        info!("Simulation time: {}", self.ticks);
    }
}

/// Results averaged over the replicas of a batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchStatistics {
    pub replicas: usize,
    pub average_velocity: f32,
    /// Median over replicas
    pub average_waiting_time: f32,
    pub average_driving_time: f32,
    /// Median over replicas
    pub average_queue_length: f32,
    pub collisions: f32,
    pub agents: f32,
    pub routes: BTreeMap<RouteKey, RouteStatistics>,
}

#[derive(Debug, Clone, Default)]
struct AgentStatistics {
    route: RouteKey,
    velocity_sum: f64,
    velocity_samples: u32,
    steps_waiting: u32,
    steps_driving: u32,
    arrived: bool,
}

impl AgentStatistics {
    fn average_velocity(&self) -> f32 {
        if self.velocity_samples == 0 {
            0.0
        } else {
            (self.velocity_sum / self.velocity_samples as f64) as f32
        }
    }
}

/// Per-tick sampler for one simulation run
#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    agents: BTreeMap<AgentId, AgentStatistics>,
    queue_lengths: Vec<usize>,
    ticks: u32,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, agent: &Agent, network: &RoadNetwork) -> &mut AgentStatistics {
        self.agents.entry(agent.id).or_insert_with(|| AgentStatistics {
            route: (
                network.node(agent.origin()).id,
                network.node(agent.destination()).id,
            ),
            ..Default::default()
        })
    }

    /// Samples one tick: every active agent drives, every queued agent waits
    pub fn record_tick<'a>(
        &mut self,
        active: impl IntoIterator<Item = (&'a Agent, &'a AgentState)>,
        queued: impl IntoIterator<Item = &'a Agent>,
        network: &RoadNetwork,
    ) {
        self.ticks += 1;
        for (agent, state) in active {
            let stats = self.entry(agent, network);
            stats.steps_driving += 1;
            stats.velocity_sum += state.velocity() as f64;
            stats.velocity_samples += 1;
            stats.arrived = state.length() <= 0.0;
        }
        let mut queue_length = 0;
        for agent in queued {
            self.entry(agent, network).steps_waiting += 1;
            queue_length += 1;
        }
        self.queue_lengths.push(queue_length);
    }

    /// Notes an agent leaving the network
    pub fn record_exit(&mut self, agent: &Agent, state: &AgentState, network: &RoadNetwork) {
        self.entry(agent, network).arrived = state.length() <= 0.0;
    }

    pub fn finish(&self, collisions: usize) -> SimulationStatistics {
        let samples: u64 = self
            .agents
            .values()
            .map(|stats| stats.velocity_samples as u64)
            .sum();
        let velocity_sum: f64 = self.agents.values().map(|stats| stats.velocity_sum).sum();

        SimulationStatistics {
            average_velocity: ratio(velocity_sum, samples as f64),
            average_waiting_time: self.mean_over_agents(|stats| stats.steps_waiting),
            average_driving_time: self.mean_over_agents(|stats| stats.steps_driving),
            average_queue_length: ratio(
                self.queue_lengths.iter().sum::<usize>() as f64,
                self.queue_lengths.len() as f64,
            ),
            collisions,
            agents: self.agents.len(),
            ticks: self.ticks,
            routes: self.route_statistics(),
        }
    }

    fn mean_over_agents(&self, steps: impl Fn(&AgentStatistics) -> u32) -> f32 {
        let total: f64 = self.agents.values().map(|stats| steps(stats) as f64).sum();
        ratio(total, self.agents.len() as f64)
    }

    fn route_statistics(&self) -> BTreeMap<RouteKey, RouteStatistics> {
        let mut routes: BTreeMap<RouteKey, RouteStatistics> = BTreeMap::new();
        for stats in self.agents.values().filter(|stats| stats.arrived) {
            let route = routes.entry(stats.route).or_default();
            route.average_velocity += stats.average_velocity();
            route.agents += 1.0;
        }
        for route in routes.values_mut() {
            route.average_velocity /= route.agents;
        }
        routes
    }
}

fn ratio(total: f64, count: f64) -> f32 {
    if count > 0.0 {
        (total / count) as f32
    } else {
        0.0
    }
}

fn median(values: impl IntoIterator<Item = f32>) -> f32 {
    let sorted = SortedVec::from_unsorted(values.into_iter().map(OrderedFloat).collect());
    sorted
        .get(sorted.len() / 2)
        .map(|value| value.into_inner())
        .unwrap_or(0.0)
}

/// Combines the results of independent replicas.
///
/// Waiting time and queue length take the median across replicas, the rest
/// the arithmetic mean. A route's velocity is averaged over the replicas
/// that saw it; its agent count over all replicas.
pub fn aggregate(replicas: &[SimulationStatistics]) -> Result<BatchStatistics> {
    if replicas.is_empty() {
        anyhow::bail!("Cannot aggregate an empty batch");
    }
    let count = replicas.len() as f32;
    let mean = |field: fn(&SimulationStatistics) -> f32| {
        replicas.iter().map(field).sum::<f32>() / count
    };

    let mut routes: BTreeMap<RouteKey, (RouteStatistics, usize)> = BTreeMap::new();
    for stats in replicas {
        for (key, route) in &stats.routes {
            let (total, seen) = routes.entry(*key).or_default();
            total.average_velocity += route.average_velocity;
            total.agents += route.agents;
            *seen += 1;
        }
    }

    Ok(BatchStatistics {
        replicas: replicas.len(),
        average_velocity: mean(|stats| stats.average_velocity),
        average_waiting_time: median(replicas.iter().map(|stats| stats.average_waiting_time)),
        average_driving_time: mean(|stats| stats.average_driving_time),
        average_queue_length: median(replicas.iter().map(|stats| stats.average_queue_length)),
        collisions: mean(|stats| stats.collisions as f32),
        agents: mean(|stats| stats.agents as f32),
        routes: routes
            .into_iter()
            .map(|(key, (total, seen))| {
                let route = RouteStatistics {
                    average_velocity: total.average_velocity / seen as f32,
                    agents: total.agents / count,
                };
                (key, route)
            })
            .collect(),
    })
}
