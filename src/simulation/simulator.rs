//! The tick-based simulator
//!
//! One tick runs, in order: spawn, admit queued agents, decide every
//! agent's move against a frozen snapshot, move, detect collisions, evict
//! agents that left the network, sample statistics and notify observers.

use anyhow::{Context, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use super::agent::{Agent, Decision};
use super::agent_state::AgentState;
use super::collision::CollisionDetector;
use super::decision::CrossroadSnapshot;
use super::observer::TickObserver;
use super::road_network::RoadNetwork;
use super::settings::SimulationSettings;
use super::spawner::spawn_agent;
use super::statistics::{SimulationStatistics, StatisticsAccumulator};
use super::types::{
    AgentId, DisplayColor, IntersectionControl, NodeId, Position, INPUT_ZONE_OFFSET,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Running,
    Finished,
}

/// Where one agent is, for renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentFrame {
    pub id: AgentId,
    pub head: Position,
    pub tail: Position,
    pub velocity: f32,
}

/// Read-only picture of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickFrame {
    pub tick: u32,
    pub agents: Vec<AgentFrame>,
    /// Display colour of every node with an intersection control
    pub controls: Vec<(NodeId, DisplayColor)>,
    pub queued: usize,
    pub collisions: usize,
}

pub struct Simulator {
    network: Arc<RoadNetwork>,
    settings: SimulationSettings,
    rng: StdRng,

    /// Active agents; `states[i]` belongs to `agents[i]`
    agents: Vec<Agent>,
    states: Vec<AgentState>,

    /// Agents waiting at their input node to be admitted
    queues: BTreeMap<NodeId, VecDeque<Agent>>,

    next_agent_id: usize,
    tick: u32,
    phase: SimulationPhase,
    collisions: CollisionDetector,
    statistics: StatisticsAccumulator,
    observers: Vec<Box<dyn TickObserver>>,
}

impl Simulator {
    /// Fails when the settings do not validate
    pub fn new(
        network: Arc<RoadNetwork>,
        settings: SimulationSettings,
        seed: u64,
    ) -> Result<Self> {
        settings.validate()?;
        let queues = network
            .input_nodes()
            .iter()
            .map(|node| (*node, VecDeque::new()))
            .collect();
        let collisions = CollisionDetector::new(settings.log_collisions);
        Ok(Self {
            network,
            settings,
            rng: StdRng::seed_from_u64(seed),
            agents: Vec::new(),
            states: Vec::new(),
            queues,
            next_agent_id: 0,
            tick: 0,
            phase: SimulationPhase::Idle,
            collisions,
            statistics: StatisticsAccumulator::new(),
            observers: Vec::new(),
        })
    }

    pub fn register_observer(&mut self, observer: Box<dyn TickObserver>) {
        self.observers.push(observer);
    }

    /// Runs ticks until the configured horizon and returns the statistics
    pub fn run(&mut self) -> Result<SimulationStatistics> {
        while self.phase != SimulationPhase::Finished {
            self.step()?;
        }
        Ok(self.statistics())
    }

    /// Advances the simulation by one tick. Does nothing once finished.
    pub fn step(&mut self) -> Result<()> {
        if self.tick >= self.settings.ticks {
            self.phase = SimulationPhase::Finished;
            return Ok(());
        }
        self.phase = SimulationPhase::Running;
        self.tick += 1;

        self.spawn_agents()?;
        self.admit_agents();
        let decisions = self.decide();
        self.move_agents(&decisions)
            .with_context(|| format!("Invariant violated at tick {}", self.tick))?;
        self.collisions.detect(&self.states, &self.network);
        self.evict_agents();
        self.statistics.record_tick(
            self.agents.iter().zip(self.states.iter()),
            self.queues.values().flatten(),
            &self.network,
        );
        self.notify_observers();

        if self.tick >= self.settings.ticks {
            self.phase = SimulationPhase::Finished;
        }
        Ok(())
    }

    fn spawn_agents(&mut self) -> Result<()> {
        let id = AgentId(self.next_agent_id);
        let Some(agent) = spawn_agent(id, &self.settings, &self.network, &mut self.rng)? else {
            return Ok(());
        };
        self.next_agent_id += 1;
        let queue = self
            .queues
            .get_mut(&agent.origin())
            .context("Route starts outside the input nodes")?;
        debug!(
            "Spawned agent {} at node {}",
            id.0,
            self.network.node(agent.origin()).id
        );
        queue.push_back(agent);
        Ok(())
    }

    /// Input nodes without an agent still standing on them
    pub fn free_input_nodes(&self) -> HashSet<NodeId> {
        let occupied: HashSet<NodeId> = self
            .states
            .iter()
            .map(|state| state.tail_position(&self.network))
            .filter(|tail| tail.offset < INPUT_ZONE_OFFSET)
            .map(|tail| self.network.edge_begin(tail.edge))
            .filter(|node| self.network.is_input(*node))
            .collect();
        self.network
            .input_nodes()
            .iter()
            .copied()
            .filter(|node| !occupied.contains(node))
            .collect()
    }

    fn admit_agents(&mut self) {
        let free = self.free_input_nodes();
        for (node, queue) in self.queues.iter_mut() {
            if !free.contains(node) {
                continue;
            }
            let Some(agent) = queue.pop_front() else {
                continue;
            };
            // Spawned agents always carry a non-empty route
            let Some(first_edge) = agent.next_edge() else {
                continue;
            };
            self.states
                .push(AgentState::admit(agent.id, first_edge, agent.vehicle.length));
            self.agents.push(agent);
        }
    }

    /// Every decision is made against the same pre-move states
    fn decide(&mut self) -> Vec<Decision> {
        let frozen = &self.states;
        let network = &*self.network;
        self.agents
            .iter_mut()
            .enumerate()
            .map(|(index, agent)| {
                let snapshot = CrossroadSnapshot::for_agent(frozen, index);
                agent.decide(&snapshot, network)
            })
            .collect()
    }

    fn move_agents(&mut self, decisions: &[Decision]) -> Result<()> {
        let network = &*self.network;
        for ((agent, state), decision) in self
            .agents
            .iter()
            .zip(self.states.iter_mut())
            .zip(decisions)
        {
            let distance = state.velocity();
            state.advance(distance, decision, network);
            state.apply_acceleration(decision.acceleration, &agent.vehicle);

            let head_length = network.edge_length(state.head_edge());
            let tail = state.tail_position(network);
            if !(0.0..=head_length).contains(&state.head_offset())
                || !(0.0..=network.edge_length(tail.edge)).contains(&tail.offset)
                || !state.velocity().is_finite()
                || state.length().is_nan()
                || state.length() < 0.0
            {
                anyhow::bail!("Agent {} left a valid position: {:?}", agent.id.0, state);
            }
        }
        Ok(())
    }

    /// Whether the vehicle has shrunk to nothing outside the input zone
    fn has_left(&self, state: &AgentState) -> bool {
        let head = state.head_position();
        if head != state.tail_position(&self.network) {
            return false;
        }
        let entering = self.network.is_input(self.network.edge_begin(head.edge))
            && head.offset < INPUT_ZONE_OFFSET;
        !entering
    }

    fn evict_agents(&mut self) {
        let agents = std::mem::take(&mut self.agents);
        let states = std::mem::take(&mut self.states);
        for (agent, state) in agents.into_iter().zip(states) {
            if self.has_left(&state) {
                debug!("Agent {} left the network at tick {}", agent.id.0, self.tick);
                self.statistics.record_exit(&agent, &state, &self.network);
            } else {
                self.agents.push(agent);
                self.states.push(state);
            }
        }
    }

    fn notify_observers(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_tick(self);
        }
        self.observers = observers;
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// States of the agents currently on the network
    pub fn states(&self) -> &[AgentState] {
        &self.states
    }

    pub fn active_agents(&self) -> impl Iterator<Item = (&Agent, &AgentState)> {
        self.agents.iter().zip(self.states.iter())
    }

    pub fn queued_agents(&self) -> impl Iterator<Item = &Agent> {
        self.queues.values().flatten()
    }

    pub fn queued_count(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.collision_count()
    }

    pub fn collision_detector(&self) -> &CollisionDetector {
        &self.collisions
    }

    pub fn statistics(&self) -> SimulationStatistics {
        self.statistics.finish(self.collisions.collision_count())
    }

    pub fn frame(&self) -> TickFrame {
        let network = &*self.network;
        let agents = self
            .states
            .iter()
            .map(|state| {
                let head = state.head_position();
                let tail = state.tail_position(network);
                AgentFrame {
                    id: state.agent_id(),
                    head: network.point_on_edge(head.edge, head.offset),
                    tail: network.point_on_edge(tail.edge, tail.offset),
                    velocity: state.velocity(),
                }
            })
            .collect();
        let controls = network
            .nodes()
            .filter(|node| network.node(*node).control != IntersectionControl::None)
            .map(|node| (node, network.node(node).control.display_color()))
            .collect();
        TickFrame {
            tick: self.tick,
            agents,
            controls,
            queued: self.queued_count(),
            collisions: self.collision_count(),
        }
    }
}
