//! Core types for the crossroad simulation
//!
//! Identifiers, 2-D geometry, intersection control and the tuning constants
//! shared by the decision policy and the simulator.

use petgraph::graph::{EdgeIndex, NodeIndex};

/// Index of a node in the road network arena
pub type NodeId = NodeIndex;

/// Index of an edge in the road network arena
pub type EdgeId = EdgeIndex;

/// A unique identifier for an agent within one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub usize);

/// A 2D position in the network plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Direction vector from this position to another (not normalized)
    pub fn direction_to(&self, other: &Position) -> (f32, f32) {
        (other.x - self.x, other.y - self.y)
    }
}

/// 2D cross product of two direction vectors.
/// Negative when `b` points clockwise of `a`.
pub fn cross((ax, ay): (f32, f32), (bx, by): (f32, f32)) -> f32 {
    ax * by - bx * ay
}

/// Kind of traffic sign placed at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignKind {
    GiveWay,
    RightOfWay,
}

/// Colour state of a traffic light.
/// Lights are display-only, the decision policy does not consult them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightColor {
    Green,
    YellowBeforeGreen,
    YellowBeforeRed,
    Red,
    RedWithGreenArrow,
}

/// Colour a renderer should use for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    Black,
    Cyan,
    Blue,
    Green,
    Yellow,
    Red,
}

/// Intersection control installed at a node, fixed at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntersectionControl {
    #[default]
    None,
    Sign(SignKind),
    Light(LightColor),
}

impl IntersectionControl {
    pub fn display_color(&self) -> DisplayColor {
        match self {
            IntersectionControl::None => DisplayColor::Black,
            IntersectionControl::Sign(SignKind::GiveWay) => DisplayColor::Cyan,
            IntersectionControl::Sign(SignKind::RightOfWay) => DisplayColor::Blue,
            IntersectionControl::Light(LightColor::Green) => DisplayColor::Green,
            IntersectionControl::Light(
                LightColor::YellowBeforeGreen | LightColor::YellowBeforeRed,
            ) => DisplayColor::Yellow,
            IntersectionControl::Light(LightColor::Red | LightColor::RedWithGreenArrow) => {
                DisplayColor::Red
            }
        }
    }
}

/// A node (intersection point, entry or exit) of the road network
#[derive(Debug, Clone)]
pub struct SimNode {
    /// Identifier from the network description
    pub id: u32,
    pub position: Position,
    pub control: IntersectionControl,
    /// Weight used when this node is drawn as a route destination
    pub exit_probability: f32,
    pub is_input: bool,
}

/// A directed road segment. Endpoints live in the graph, so two edges are
/// the same edge exactly when they join the same pair of nodes.
#[derive(Debug, Clone, Copy)]
pub struct SimEdge {
    pub length: f32,
}

/// Below this velocity a vehicle counts as moving slowly
pub const SLOW_SPEED: f32 = 0.1;

/// Ticks to contact under which a closing vehicle brakes
pub const SAFE_TIME_GAP: f32 = 30.0;

/// Velocity under which a vehicle blocking an exit counts as stationary
pub const STATIONARY_VELOCITY: f32 = 0.05;

/// Crossings closer than this are always checked for right-hand traffic
pub const CROSSING_LOOKAHEAD: f32 = 0.5;

/// Only crossings this close are considered for the box-blocking check
pub const BLOCK_BOX_DISTANCE: f32 = 1.0;

/// Offset from an input node inside which a vehicle still occupies it
pub const INPUT_ZONE_OFFSET: f32 = 0.1;
