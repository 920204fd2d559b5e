//! Road network graph
//!
//! Nodes and edges live in a petgraph arena; an edge is a pair of node
//! indices plus its length. The network is immutable once built and is
//! shared read-only between simulations.

use anyhow::{Context, Result};
use log::warn;
use petgraph::graph::DiGraph;
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::types::{cross, EdgeId, NodeId, Position, SimEdge, SimNode};

/// Bounding box of all node positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkDimensions {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Immutable directed graph of the crossroad geometry
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    /// The underlying petgraph directed graph
    graph: DiGraph<SimNode, SimEdge>,

    /// Maps description ids to their node indices in the graph
    id_to_node: HashMap<u32, NodeId>,

    /// Entry points, ordered by description id
    input_nodes: Vec<NodeId>,

    /// Exit points reachable from the entry points, ordered by description id
    sink_nodes: Vec<NodeId>,
}

impl RoadNetwork {
    /// Builds the network from a graph whose nodes flag their input status.
    ///
    /// Nodes not reachable from any input node are dropped. Sinks are the
    /// remaining nodes without outgoing edges.
    pub fn new(graph: DiGraph<SimNode, SimEdge>) -> Result<Self> {
        let inputs: Vec<NodeId> = graph
            .node_indices()
            .filter(|node| graph[*node].is_input)
            .collect();
        if inputs.is_empty() {
            anyhow::bail!("Network has no input nodes");
        }

        let mut reachable = HashSet::new();
        for input in &inputs {
            if reachable.contains(input) {
                continue;
            }
            let mut bfs = Bfs::new(&graph, *input);
            while let Some(node) = bfs.next(&graph) {
                reachable.insert(node);
            }
        }

        let dropped = graph.node_count() - reachable.len();
        if dropped > 0 {
            warn!("Dropping {} node(s) unreachable from any input node", dropped);
        }

        let graph = graph.filter_map(
            |node, weight| reachable.contains(&node).then(|| weight.clone()),
            |_, weight| Some(*weight),
        );

        let id_to_node: HashMap<u32, NodeId> = graph
            .node_indices()
            .map(|node| (graph[node].id, node))
            .collect();

        let mut input_nodes: Vec<NodeId> = graph
            .node_indices()
            .filter(|node| graph[*node].is_input)
            .collect();
        input_nodes.sort_by_key(|node| graph[*node].id);

        let mut sink_nodes: Vec<NodeId> = graph.externals(Direction::Outgoing).collect();
        sink_nodes.sort_by_key(|node| graph[*node].id);
        if sink_nodes.is_empty() {
            anyhow::bail!("Network has no sink nodes reachable from its inputs");
        }

        Ok(Self {
            graph,
            id_to_node,
            input_nodes,
            sink_nodes,
        })
    }

    /// Gets a node by index
    pub fn node(&self, node: NodeId) -> &SimNode {
        &self.graph[node]
    }

    /// Looks up a node by its description id
    pub fn node_by_id(&self, id: u32) -> Result<NodeId> {
        self.id_to_node
            .get(&id)
            .copied()
            .with_context(|| format!("Node {} not found", id))
    }

    pub fn position(&self, node: NodeId) -> Position {
        self.graph[node].position
    }

    pub fn edge_length(&self, edge: EdgeId) -> f32 {
        self.graph[edge].length
    }

    /// (begin, end) nodes of an edge
    pub fn endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        // Edge ids are only ever handed out by this graph
        self.graph
            .edge_endpoints(edge)
            .unwrap_or_else(|| panic!("edge {:?} not in network", edge))
    }

    pub fn edge_begin(&self, edge: EdgeId) -> NodeId {
        self.endpoints(edge).0
    }

    pub fn edge_end(&self, edge: EdgeId) -> NodeId {
        self.endpoints(edge).1
    }

    /// Finds the edge connecting two nodes
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graph.find_edge(from, to)
    }

    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| edge.id())
    }

    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
    }

    /// A crossing is a node with at least two incoming edges
    pub fn is_crossing(&self, node: NodeId) -> bool {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .nth(1)
            .is_some()
    }

    /// Incoming edges of `approach`'s end node that arrive from the right of
    /// `approach`.
    pub fn right_hand_incoming_edges(&self, approach: EdgeId) -> Vec<EdgeId> {
        let approach_direction = self.edge_direction(approach);
        self.incoming_edges(self.edge_end(approach))
            .filter(|edge| *edge != approach)
            .filter(|edge| cross(approach_direction, self.edge_direction(*edge)) < 0.0)
            .collect()
    }

    fn edge_direction(&self, edge: EdgeId) -> (f32, f32) {
        let (begin, end) = self.endpoints(edge);
        self.position(begin).direction_to(&self.position(end))
    }

    /// Point at `offset` along an edge, clamped to the edge
    pub fn point_on_edge(&self, edge: EdgeId, offset: f32) -> Position {
        let (begin, end) = self.endpoints(edge);
        let length = self.edge_length(edge);
        let t = if length > 0.0 {
            (offset / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.position(begin).lerp(&self.position(end), t)
    }

    pub fn input_nodes(&self) -> &[NodeId] {
        &self.input_nodes
    }

    pub fn is_input(&self, node: NodeId) -> bool {
        self.graph[node].is_input
    }

    pub fn sink_nodes(&self) -> &[NodeId] {
        &self.sink_nodes
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }

    /// Get number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn dimensions(&self) -> NetworkDimensions {
        let mut dimensions = NetworkDimensions {
            min_x: f32::MAX,
            min_y: f32::MAX,
            max_x: f32::MIN,
            max_y: f32::MIN,
        };
        for node in self.graph.node_weights() {
            dimensions.min_x = dimensions.min_x.min(node.position.x);
            dimensions.min_y = dimensions.min_y.min(node.position.y);
            dimensions.max_x = dimensions.max_x.max(node.position.x);
            dimensions.max_y = dimensions.max_y.max(node.position.y);
        }
        dimensions
    }
}
