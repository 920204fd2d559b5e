//! Networks and helpers shared by the integration tests

#![allow(dead_code)]

use crossroad_sim::simulation::{
    Agent, AgentId, DriverProfile, EdgeId, NetworkDescription, RoadNetwork, VehicleProfile,
};

/// Input 1 at (0,0) -> 2 at (10,0) -> sink 3 at (20,0)
pub const STRAIGHT_ROAD: &str = r#"{
    "nodes": [
        {"id": 1, "x": 0, "y": 0, "input": true},
        {"id": 2, "x": 10, "y": 0},
        {"id": 3, "x": 20, "y": 0, "probability": 1.0}
    ],
    "edges": [
        {"start": 1, "end": 2},
        {"start": 2, "end": 3}
    ]
}"#;

/// Input 1 at (0,0) -> sink 2 at (5,0)
pub const TWO_NODES: &str = r#"{
    "nodes": [
        {"id": 1, "x": 0, "y": 0, "input": true},
        {"id": 2, "x": 5, "y": 0, "probability": 1.0}
    ],
    "edges": [
        {"start": 1, "end": 2}
    ]
}"#;

/// Four approaches (inputs 1-4) meeting at crossing 0, which has a
/// right-of-way sign, and four exits (sinks 5-8).
pub const FOUR_WAY: &str = r#"{
    "nodes": [
        {"id": 0, "x": 0, "y": 0, "sign": "right_of_way"},
        {"id": 1, "x": 0, "y": -10, "input": true},
        {"id": 2, "x": 10, "y": 0, "input": true},
        {"id": 3, "x": 0, "y": 10, "input": true},
        {"id": 4, "x": -10, "y": 0, "input": true},
        {"id": 5, "x": 20, "y": 1, "probability": 0.25},
        {"id": 6, "x": -20, "y": -1, "probability": 0.25},
        {"id": 7, "x": 1, "y": 20, "probability": 0.25},
        {"id": 8, "x": -1, "y": -20, "probability": 0.25}
    ],
    "edges": [
        {"start": 1, "end": 0},
        {"start": 2, "end": 0},
        {"start": 3, "end": 0},
        {"start": 4, "end": 0},
        {"start": 0, "end": 5},
        {"start": 0, "end": 6},
        {"start": 0, "end": 7},
        {"start": 0, "end": 8}
    ]
}"#;

pub fn build(json: &str) -> RoadNetwork {
    NetworkDescription::from_json(json)
        .and_then(|description| description.build())
        .expect("test network should load")
}

pub fn edge(network: &RoadNetwork, from: u32, to: u32) -> EdgeId {
    let from = network.node_by_id(from).expect("start node exists");
    let to = network.node_by_id(to).expect("end node exists");
    network.find_edge(from, to).expect("edge exists")
}

pub fn driver(madness: f32) -> DriverProfile {
    DriverProfile {
        safe_distance_moving: 0.4,
        safe_distance_stationary: 1.05,
        madness,
    }
}

pub fn vehicle() -> VehicleProfile {
    VehicleProfile {
        acceleration: 0.01,
        deceleration: 0.1,
        max_velocity: 0.2,
        length: 0.8,
    }
}

/// An agent routed from node `from` to node `to`
pub fn agent(network: &RoadNetwork, id: usize, from: u32, to: u32, driver: DriverProfile) -> Agent {
    let from = network.node_by_id(from).expect("origin exists");
    let to = network.node_by_id(to).expect("destination exists");
    let route = network.find_route(from, to).expect("route exists");
    Agent::new(AgentId(id), driver, vehicle(), route)
}
