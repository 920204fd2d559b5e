//! Route generation over the road network
//!
//! Routes go from a uniformly drawn input node to a sink drawn by exit
//! probability, along the breadth-first (fewest edges) path.

use anyhow::Result;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

use super::road_network::RoadNetwork;
use super::types::{EdgeId, NodeId};

/// Contiguous sequence of edges from an input node to a sink
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    edges: Vec<EdgeId>,
    origin: NodeId,
    destination: NodeId,
}

impl Route {
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn first_edge(&self) -> EdgeId {
        // Routes are never empty, see `RoadNetwork::find_route`
        self.edges[0]
    }

    pub fn into_edges(self) -> Vec<EdgeId> {
        self.edges
    }
}

impl RoadNetwork {
    /// Draws a random route: uniform input node, weighted sink.
    pub fn random_route<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Route> {
        let inputs = self.input_nodes();
        let input = inputs[rng.random_range(0..inputs.len())];
        let sink = self.pick_sink(rng.random::<f32>());
        self.find_route(input, sink)
    }

    /// Picks the sink whose cumulative exit probability first reaches `draw`.
    /// Sinks without exit probability are never picked unless no sink has
    /// any. Falls back to the last eligible sink when rounding leaves the
    /// draw unresolved.
    pub fn pick_sink(&self, draw: f32) -> NodeId {
        let sinks = self.sink_nodes();
        let mut eligible = sinks
            .iter()
            .copied()
            .filter(|sink| self.node(*sink).exit_probability > 0.0)
            .peekable();
        if eligible.peek().is_none() {
            // `RoadNetwork::new` refuses networks without sinks
            return sinks[sinks.len() - 1];
        }

        let mut probability_sum = 0.0;
        let mut last = sinks[sinks.len() - 1];
        for sink in eligible {
            probability_sum += self.node(sink).exit_probability;
            if probability_sum >= draw {
                return sink;
            }
            last = sink;
        }
        last
    }

    /// Finds the route with the fewest edges between two nodes
    pub fn find_route(&self, from: NodeId, to: NodeId) -> Result<Route> {
        if from == to {
            anyhow::bail!(
                "Route from node {} to itself is empty",
                self.node(from).id
            );
        }

        let mut queue = VecDeque::from([from]);
        let mut reached_by: HashMap<NodeId, EdgeId> = HashMap::new();
        let mut found = false;

        while let Some(current) = queue.pop_front() {
            if current == to {
                found = true;
                break;
            }
            for (edge, next) in self.outgoing_edges(current) {
                if next != from && !reached_by.contains_key(&next) {
                    reached_by.insert(next, edge);
                    queue.push_back(next);
                }
            }
        }

        if !found {
            anyhow::bail!(
                "No route from node {} to sink {}; every input node must reach every sink with positive exit probability",
                self.node(from).id,
                self.node(to).id
            );
        }

        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            let edge = reached_by[&current];
            edges.push(edge);
            current = self.edge_begin(edge);
        }
        edges.reverse();

        Ok(Route {
            edges,
            origin: from,
            destination: to,
        })
    }
}
