//! Collision detection between active agents
//!
//! Pairs are remembered for the whole run, so a pair that stays in contact
//! over several ticks is counted once.

use log::info;
use std::collections::HashSet;

use super::agent_state::AgentState;
use super::road_network::RoadNetwork;
use super::types::AgentId;

#[derive(Debug, Default)]
pub struct CollisionDetector {
    /// Colliding pairs seen so far, smaller id first
    previous_collisions: HashSet<(AgentId, AgentId)>,
    log_collisions: bool,
}

impl CollisionDetector {
    pub fn new(log_collisions: bool) -> Self {
        Self {
            previous_collisions: HashSet::new(),
            log_collisions,
        }
    }

    /// Checks every unordered pair and records new collisions.
    /// Returns the number of pairs recorded by this call.
    pub fn detect(&mut self, states: &[AgentState], network: &RoadNetwork) -> usize {
        let mut new_collisions = 0;
        for (i, first) in states.iter().enumerate() {
            for second in &states[i + 1..] {
                if !collides(first, second, network) {
                    continue;
                }
                let pair = ordered_pair(first.agent_id(), second.agent_id());
                if self.previous_collisions.insert(pair) {
                    new_collisions += 1;
                    if self.log_collisions {
                        info!(
                            "Collision between agents {} and {}, number of collisions: {}",
                            pair.0 .0,
                            pair.1 .0,
                            self.previous_collisions.len()
                        );
                    }
                }
            }
        }
        new_collisions
    }

    pub fn collision_count(&self) -> usize {
        self.previous_collisions.len()
    }

    pub fn has_collided(&self, a: AgentId, b: AgentId) -> bool {
        self.previous_collisions.contains(&ordered_pair(a, b))
    }
}

fn ordered_pair(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether two vehicles overlap
pub fn collides(a: &AgentState, b: &AgentState, network: &RoadNetwork) -> bool {
    share_node(a, b, network) || share_middle_edge(a, b) || rear_ended(a, b, network)
        || rear_ended(b, a, network)
}

fn share_node(a: &AgentState, b: &AgentState, network: &RoadNetwork) -> bool {
    let a_nodes = a.occupied_nodes(network);
    if a_nodes.is_empty() {
        return false;
    }
    let b_nodes = b.occupied_nodes(network);
    !a_nodes.is_disjoint(&b_nodes)
}

fn share_middle_edge(a: &AgentState, b: &AgentState) -> bool {
    if a.edge_count() < 3 || b.edge_count() < 3 {
        return false;
    }
    !a.middle_edges().is_disjoint(&b.middle_edges())
}

/// `rear`'s head has run into `front`'s tail
fn rear_ended(rear: &AgentState, front: &AgentState, network: &RoadNetwork) -> bool {
    let front_tail = front.tail_position(network);
    if rear.head_edge() != front_tail.edge || rear.head_offset() < front_tail.offset {
        return false;
    }
    rear.head_edge() != front.head_edge() || front.head_offset() >= rear.head_offset()
}
