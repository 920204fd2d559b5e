//! Crossroad traffic simulation
//!
//! Agents spawn at input nodes, follow a route to a sink and avoid each
//! other with local right-of-way and following-distance rules. The module
//! runs headless; renderers read [`TickFrame`]s and observers pull state
//! through the [`Simulator`] accessors.

mod agent;
mod agent_state;
mod batch;
mod collision;
mod decision;
mod loader;
mod observer;
mod road_network;
mod route_finder;
mod settings;
mod simulator;
mod spawner;
mod statistics;
mod types;

pub use agent::{Acceleration, Agent, Decision, DriverProfile, VehicleProfile};
pub use agent_state::{AgentPosition, AgentState};
pub use batch::{replica_seed, run_batch};
pub use collision::{collides, CollisionDetector};
pub use decision::CrossroadSnapshot;
pub use loader::{
    load_network, EdgeDescription, LightDescription, NetworkDescription, NodeDescription,
    SignDescription,
};
pub use observer::{ProgressLogger, TickObserver};
pub use road_network::{NetworkDimensions, RoadNetwork};
pub use route_finder::Route;
pub use settings::{SimulationSettings, DEFAULT_REPLICAS};
pub use simulator::{AgentFrame, SimulationPhase, Simulator, TickFrame};
pub use spawner::{
    madness_factor, spawn_agent, spawn_probability, VEHICLE_ACCELERATION, VEHICLE_DECELERATION,
    VEHICLE_LENGTH,
};
pub use statistics::{
    aggregate, BatchStatistics, RouteKey, RouteStatistics, SimulationStatistics,
    StatisticsAccumulator,
};
pub use types::{
    cross, AgentId, DisplayColor, EdgeId, IntersectionControl, LightColor, NodeId, Position,
    SignKind, SimEdge, SimNode, BLOCK_BOX_DISTANCE, CROSSING_LOOKAHEAD, INPUT_ZONE_OFFSET,
    SAFE_TIME_GAP, SLOW_SPEED, STATIONARY_VELOCITY,
};
