//! Network description loading
//!
//! Reads the JSON node/edge description and resolves it into a
//! [`RoadNetwork`].

use anyhow::{Context, Result};
use log::{info, warn};
use petgraph::graph::DiGraph;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::road_network::RoadNetwork;
use super::types::{IntersectionControl, LightColor, Position, SignKind, SimEdge, SimNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignDescription {
    GiveWay,
    RightOfWay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightDescription {
    Green,
    YellowBeforeGreen,
    YellowBeforeRed,
    Red,
    RedWithGreenArrow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDescription {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub input: bool,
    #[serde(default)]
    pub probability: Option<f32>,
    #[serde(default)]
    pub sign: Option<SignDescription>,
    #[serde(default)]
    pub light: Option<LightDescription>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EdgeDescription {
    pub start: u32,
    pub end: u32,
}

/// The on-disk network format
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDescription {
    pub nodes: Vec<NodeDescription>,
    pub edges: Vec<EdgeDescription>,
}

impl NodeDescription {
    fn control(&self) -> Result<IntersectionControl> {
        let control = match (self.sign, self.light) {
            (Some(_), Some(_)) => {
                anyhow::bail!("Node {} has both a sign and a traffic light", self.id)
            }
            (Some(SignDescription::GiveWay), None) => IntersectionControl::Sign(SignKind::GiveWay),
            (Some(SignDescription::RightOfWay), None) => {
                IntersectionControl::Sign(SignKind::RightOfWay)
            }
            (None, Some(light)) => IntersectionControl::Light(match light {
                LightDescription::Green => LightColor::Green,
                LightDescription::YellowBeforeGreen => LightColor::YellowBeforeGreen,
                LightDescription::YellowBeforeRed => LightColor::YellowBeforeRed,
                LightDescription::Red => LightColor::Red,
                LightDescription::RedWithGreenArrow => LightColor::RedWithGreenArrow,
            }),
            (None, None) => IntersectionControl::None,
        };
        Ok(control)
    }
}

impl NetworkDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Malformed network description")
    }

    /// Resolves node ids and builds the road network
    pub fn build(&self) -> Result<RoadNetwork> {
        let mut graph = DiGraph::new();
        let mut id_to_node = HashMap::new();

        for node in &self.nodes {
            if id_to_node.contains_key(&node.id) {
                anyhow::bail!("Duplicate node id {}", node.id);
            }
            let exit_probability = node.probability.unwrap_or(0.0);
            if !exit_probability.is_finite() || exit_probability < 0.0 {
                anyhow::bail!("Node {} has invalid probability {}", node.id, exit_probability);
            }
            let index = graph.add_node(SimNode {
                id: node.id,
                position: Position::new(node.x as f32, node.y as f32),
                control: node.control()?,
                exit_probability,
                is_input: node.input,
            });
            id_to_node.insert(node.id, index);
        }

        for edge in &self.edges {
            let start = *id_to_node
                .get(&edge.start)
                .with_context(|| format!("Edge refers to unknown start node {}", edge.start))?;
            let end = *id_to_node
                .get(&edge.end)
                .with_context(|| format!("Edge refers to unknown end node {}", edge.end))?;

            let length = graph[start].position.distance(&graph[end].position);
            if length <= 0.0 {
                anyhow::bail!(
                    "Edge {} -> {} has zero length",
                    edge.start,
                    edge.end
                );
            }
            if graph.find_edge(start, end).is_some() {
                warn!("Ignoring duplicate edge {} -> {}", edge.start, edge.end);
                continue;
            }
            graph.add_edge(start, end, SimEdge { length });
        }

        RoadNetwork::new(graph)
    }
}

/// Loads a road network from a JSON description file
pub fn load_network(path: &Path) -> Result<RoadNetwork> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read network file {}", path.display()))?;
    let network = NetworkDescription::from_json(&contents)
        .and_then(|description| description.build())
        .with_context(|| format!("Failed to load network file {}", path.display()))?;
    info!(
        "Loaded network {}: {} nodes, {} edges, {} inputs, {} sinks",
        path.display(),
        network.node_count(),
        network.edge_count(),
        network.input_nodes().len(),
        network.sink_nodes().len()
    );
    Ok(network)
}
