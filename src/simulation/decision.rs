//! Decision policy
//!
//! Every agent accelerates unless one of four checks asks it to brake:
//! following distance, a vehicle sitting in the next node, right-hand
//! traffic at the next crossing, or an exit it could not clear. All checks
//! read a [`CrossroadSnapshot`] taken before anybody moved this tick.

use ordered_float::OrderedFloat;

use super::agent::{Acceleration, Agent, DriverProfile};
use super::agent_state::{AgentPosition, AgentState};
use super::road_network::RoadNetwork;
use super::types::{
    EdgeId, NodeId, BLOCK_BOX_DISTANCE, CROSSING_LOOKAHEAD, SAFE_TIME_GAP, SLOW_SPEED,
    STATIONARY_VELOCITY,
};

/// Frozen view of the crossroad for one agent: its own state and the
/// states of every other active agent.
#[derive(Debug, Clone)]
pub struct CrossroadSnapshot<'a> {
    me: &'a AgentState,
    others: Vec<&'a AgentState>,
}

impl<'a> CrossroadSnapshot<'a> {
    pub fn new(me: &'a AgentState, others: impl IntoIterator<Item = &'a AgentState>) -> Self {
        Self {
            me,
            others: others.into_iter().collect(),
        }
    }

    /// Snapshot for `states[index]` against the rest of `states`
    pub fn for_agent(states: &'a [AgentState], index: usize) -> Self {
        let others = states
            .iter()
            .enumerate()
            .filter(move |(other, _)| *other != index)
            .map(|(_, state)| state);
        Self::new(&states[index], others)
    }

    pub fn me(&self) -> &'a AgentState {
        self.me
    }

    pub fn others(&self) -> &[&'a AgentState] {
        &self.others
    }
}

/// The first crossing along the rest of the route
#[derive(Debug, Clone, Copy)]
struct RouteCrossing {
    node: NodeId,
    /// Edge the agent arrives on
    approach: EdgeId,
    /// Distance from the agent's head to the crossing
    distance: f32,
}

pub(crate) fn acceleration(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
) -> Acceleration {
    let crossing = nearest_route_crossing(agent, snapshot, network);
    if follows_too_closely(agent, snapshot, network)
        || drives_into_side(agent, snapshot, network)
        || must_yield_to_right(agent, snapshot, network, crossing)
        || would_block_crossing(agent, snapshot, network, crossing)
    {
        Acceleration::Brake
    } else {
        Acceleration::Accelerate
    }
}

fn should_brake(driver: &DriverProfile, distance: f32, my_speed: f32, their_speed: f32) -> bool {
    let closing_speed = my_speed - their_speed;
    let too_close_while_driving = distance < driver.safe_distance_moving && my_speed >= SLOW_SPEED;
    let too_close_while_crawling =
        distance < driver.safe_distance_stationary && my_speed < SLOW_SPEED;
    too_close_while_driving
        || too_close_while_crawling
        || (closing_speed > 0.0 && distance / closing_speed < SAFE_TIME_GAP)
}

/// Ticks needed to cover `distance`; a stopped vehicle never arrives
fn time_to_reach(distance: f32, velocity: f32) -> f32 {
    if velocity > 0.0 {
        distance / velocity
    } else {
        f32::INFINITY
    }
}

/// The other agent whose tail is nearest the start of `edge`
fn nearest_on_edge<'a>(
    snapshot: &CrossroadSnapshot<'a>,
    edge: EdgeId,
    network: &RoadNetwork,
) -> Option<(&'a AgentState, AgentPosition)> {
    snapshot
        .others()
        .iter()
        .map(|state| (*state, state.tail_position(network)))
        .filter(|(_, tail)| tail.edge == edge)
        .min_by_key(|(_, tail)| OrderedFloat(tail.offset))
}

fn follows_too_closely(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
) -> bool {
    let me = snapshot.me();
    let head = me.head_position();

    let ahead_on_edge = snapshot
        .others()
        .iter()
        .map(|state| (*state, state.tail_position(network)))
        .filter(|(_, tail)| tail.edge == head.edge && tail.offset >= head.offset)
        .min_by_key(|(_, tail)| OrderedFloat(tail.offset));

    let leader = match ahead_on_edge {
        Some((state, tail)) => Some((state, tail.offset - head.offset)),
        None => agent
            .next_edge()
            .and_then(|next| nearest_on_edge(snapshot, next, network))
            .map(|(state, tail)| {
                let gap = tail.offset + network.edge_length(head.edge) - head.offset;
                (state, gap)
            }),
    };

    match leader {
        Some((state, gap)) => should_brake(&agent.driver, gap, me.velocity(), state.velocity()),
        None => false,
    }
}

fn drives_into_side(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
) -> bool {
    let me = snapshot.me();
    let head = me.head_position();
    let next_node = network.edge_end(head.edge);
    let node_taken = snapshot
        .others()
        .iter()
        .any(|state| state.occupied_nodes(network).contains(&next_node));
    if !node_taken {
        return false;
    }
    let distance = network.edge_length(head.edge) - head.offset;
    should_brake(&agent.driver, distance, me.velocity(), 0.0)
}

fn nearest_route_crossing(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
) -> Option<RouteCrossing> {
    let head = snapshot.me().head_position();
    let mut distance = network.edge_length(head.edge) - head.offset;
    let mut approach = head.edge;
    for edge in agent.remaining_route() {
        let node = network.edge_begin(edge);
        if network.is_crossing(node) {
            return Some(RouteCrossing {
                node,
                approach,
                distance,
            });
        }
        distance += network.edge_length(edge);
        approach = edge;
    }
    None
}

fn must_yield_to_right(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
    crossing: Option<RouteCrossing>,
) -> bool {
    let Some(crossing) = crossing else {
        return false;
    };
    let madness = agent.driver.madness;
    let reaction_time = 3.0 - (madness - 0.5) * 4.0;
    let my_time = time_to_reach(crossing.distance, snapshot.me().velocity());
    if my_time > reaction_time && crossing.distance > CROSSING_LOOKAHEAD {
        return false;
    }

    let yield_time = 10.0 - (madness - 0.5) * 10.0;
    network
        .right_hand_incoming_edges(crossing.approach)
        .into_iter()
        .filter_map(|edge| {
            snapshot
                .others()
                .iter()
                .filter(|state| state.head_edge() == edge)
                .max_by_key(|state| OrderedFloat(state.head_offset()))
        })
        .any(|state| {
            let distance = network.edge_length(state.head_edge()) - state.head_offset();
            time_to_reach(distance, state.velocity()) < yield_time
        })
}

fn would_block_crossing(
    agent: &Agent,
    snapshot: &CrossroadSnapshot<'_>,
    network: &RoadNetwork,
    crossing: Option<RouteCrossing>,
) -> bool {
    let Some(crossing) = crossing else {
        return false;
    };
    if crossing.distance > BLOCK_BOX_DISTANCE {
        return false;
    }
    let head = snapshot.me().head_position();
    if crossing.node != network.edge_end(head.edge) {
        return false;
    }
    let Some(next) = agent.next_edge() else {
        return false;
    };
    let Some((blocker, tail)) = nearest_on_edge(snapshot, next, network) else {
        return false;
    };
    let stationary = agent.driver.safe_distance_stationary;
    if tail.offset > snapshot.me().length() + stationary
        || blocker.velocity() > STATIONARY_VELOCITY
    {
        return false;
    }
    network.edge_length(head.edge) - head.offset <= stationary
}
