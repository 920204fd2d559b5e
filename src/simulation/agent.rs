//! Agents: a driver and a vehicle bound to a route

use std::collections::VecDeque;

use super::decision::{self, CrossroadSnapshot};
use super::road_network::RoadNetwork;
use super::route_finder::Route;
use super::types::{AgentId, EdgeId, NodeId};

/// Kinematic parameters of a vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    /// Velocity gained per accelerating tick
    pub acceleration: f32,
    /// Velocity lost per braking tick
    pub deceleration: f32,
    pub max_velocity: f32,
    /// Length at admission; the live length is tracked by the agent state
    pub length: f32,
}

/// Behavioural parameters of a driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverProfile {
    pub safe_distance_moving: f32,
    pub safe_distance_stationary: f32,
    /// Aggressiveness in [0, 1]; higher values shorten reaction thresholds
    pub madness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceleration {
    Accelerate,
    Keep,
    Brake,
}

impl Acceleration {
    pub fn velocity_difference(&self, vehicle: &VehicleProfile) -> f32 {
        match self {
            Acceleration::Accelerate => vehicle.acceleration,
            Acceleration::Keep => 0.0,
            Acceleration::Brake => -vehicle.deceleration,
        }
    }
}

/// What an agent does this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub acceleration: Acceleration,
    /// Edge to enter when the head runs past the current edge
    pub next_edge: Option<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub driver: DriverProfile,
    pub vehicle: VehicleProfile,
    /// Route edges the head has not entered yet
    route: VecDeque<EdgeId>,
    origin: NodeId,
    destination: NodeId,
}

impl Agent {
    pub fn new(id: AgentId, driver: DriverProfile, vehicle: VehicleProfile, route: Route) -> Self {
        let origin = route.origin();
        let destination = route.destination();
        Self {
            id,
            driver,
            vehicle,
            route: route.into_edges().into(),
            origin,
            destination,
        }
    }

    pub fn next_edge(&self) -> Option<EdgeId> {
        self.route.front().copied()
    }

    pub fn remaining_route(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.route.iter().copied()
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Decides this tick's move from the frozen snapshot.
    ///
    /// Consumes the next route edge once the head has entered it.
    pub fn decide(&mut self, snapshot: &CrossroadSnapshot<'_>, network: &RoadNetwork) -> Decision {
        if self.next_edge() == Some(snapshot.me().head_edge()) {
            self.route.pop_front();
        }
        Decision {
            acceleration: decision::acceleration(self, snapshot, network),
            next_edge: self.next_edge(),
        }
    }
}
