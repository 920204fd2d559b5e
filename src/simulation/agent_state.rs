//! Per-tick kinematic state of an agent on the network
//!
//! A vehicle spans a contiguous chain of edges, head edge first. Only the
//! head offset is stored; the tail is found by walking the chain back by
//! the vehicle length.

use anyhow::Result;
use std::collections::{HashSet, VecDeque};

use super::agent::{Acceleration, Decision, VehicleProfile};
use super::road_network::RoadNetwork;
use super::types::{AgentId, EdgeId, NodeId};

/// A point on the network: an edge and the distance along it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPosition {
    pub edge: EdgeId,
    pub offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    agent_id: AgentId,
    /// Edges spanned by the vehicle, head edge at the front. Never empty.
    edges: VecDeque<EdgeId>,
    /// Distance of the head along the head edge
    head_offset: f32,
    velocity: f32,
    /// Current vehicle length; shrinks to zero as the vehicle leaves the network
    length: f32,
}

impl AgentState {
    /// A stationary vehicle at the start of `edge`
    pub fn admit(agent_id: AgentId, edge: EdgeId, length: f32) -> Self {
        Self {
            agent_id,
            edges: VecDeque::from([edge]),
            head_offset: 0.0,
            velocity: 0.0,
            length: length.max(0.0),
        }
    }

    /// A vehicle at an arbitrary position. `edges` runs head first and must
    /// be contiguous.
    pub fn placed(
        agent_id: AgentId,
        edges: Vec<EdgeId>,
        head_offset: f32,
        velocity: f32,
        length: f32,
    ) -> Result<Self> {
        if edges.is_empty() {
            anyhow::bail!("Agent {} must span at least one edge", agent_id.0);
        }
        Ok(Self {
            agent_id,
            edges: edges.into(),
            head_offset: head_offset.max(0.0),
            velocity: velocity.max(0.0),
            length: length.max(0.0),
        })
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn head_offset(&self) -> f32 {
        self.head_offset
    }

    pub fn head_edge(&self) -> EdgeId {
        self.edges[0]
    }

    pub fn tail_edge(&self) -> EdgeId {
        self.edges[self.edges.len() - 1]
    }

    /// Edges spanned, head edge first
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn head_position(&self) -> AgentPosition {
        AgentPosition {
            edge: self.head_edge(),
            offset: self.head_offset,
        }
    }

    /// Rear of the vehicle. When the chain is shorter than the vehicle
    /// (it is still entering the network) the tail sits at the chain start.
    pub fn tail_position(&self, network: &RoadNetwork) -> AgentPosition {
        let mut remaining = self.length - self.head_offset;
        let mut chain = self.edges.iter().copied();
        let mut edge = self.head_edge();
        chain.next();
        while remaining > 0.0 {
            match chain.next() {
                Some(previous) => {
                    edge = previous;
                    remaining -= network.edge_length(previous);
                }
                None => return AgentPosition { edge, offset: 0.0 },
            }
        }
        AgentPosition {
            edge,
            offset: -remaining,
        }
    }

    /// Nodes under the vehicle: the end of every spanned edge but the head edge
    pub fn occupied_nodes(&self, network: &RoadNetwork) -> HashSet<NodeId> {
        self.edges
            .iter()
            .skip(1)
            .map(|edge| network.edge_end(*edge))
            .collect()
    }

    /// Spanned edges without the head and tail edges
    pub fn middle_edges(&self) -> HashSet<EdgeId> {
        if self.edges.len() < 3 {
            return HashSet::new();
        }
        self.edges
            .iter()
            .skip(1)
            .take(self.edges.len() - 2)
            .copied()
            .collect()
    }

    /// Advances the vehicle by `distance` along the chain.
    ///
    /// Past the route end the vehicle is shortened instead, which is how it
    /// leaves the network.
    pub fn advance(&mut self, distance: f32, decision: &Decision, network: &RoadNetwork) {
        let distance = distance.max(0.0);

        let tail = self.tail_position(network);
        if network.edge_length(tail.edge) - tail.offset < distance {
            if self.edges.len() > 1 {
                self.edges.pop_back();
            } else {
                self.length = 0.0;
            }
        }

        let head_length = network.edge_length(self.head_edge());
        let distance_left = head_length - self.head_offset;
        if distance > distance_left {
            let overflow = distance - distance_left;
            match decision.next_edge {
                Some(next) => {
                    self.edges.push_front(next);
                    self.head_offset = overflow.min(network.edge_length(next));
                }
                None => {
                    self.shorten(overflow);
                    self.head_offset = head_length;
                }
            }
        } else {
            self.head_offset = (self.head_offset + distance).min(head_length);
        }
    }

    /// Applies the decision's acceleration, keeping velocity in [0, max]
    pub fn apply_acceleration(&mut self, acceleration: Acceleration, vehicle: &VehicleProfile) {
        let velocity = self.velocity + acceleration.velocity_difference(vehicle);
        self.velocity = velocity.clamp(0.0, vehicle.max_velocity);
    }

    fn shorten(&mut self, deficit: f32) {
        self.length = (self.length - deficit).max(0.0);
    }
}
