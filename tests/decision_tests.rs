mod common;

use common::{agent, build, driver, edge, FOUR_WAY, STRAIGHT_ROAD};
use crossroad_sim::simulation::{Acceleration, AgentId, AgentState, CrossroadSnapshot};

/// Test that a lone agent on a free road accelerates
#[test]
fn test_free_road_accelerates() {
    let network = build(STRAIGHT_ROAD);
    let mut me = agent(&network, 0, 1, 3, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 2)], 2.0, 0.2, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, Vec::<&AgentState>::new()), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
    assert_eq!(decision.next_edge, Some(edge(&network, 2, 3)));
}

/// Test that an agent brakes when the leader's tail is inside its safe distance
#[test]
fn test_brakes_behind_close_leader() {
    let network = build(STRAIGHT_ROAD);
    let road = edge(&network, 1, 2);
    let mut me = agent(&network, 0, 1, 3, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![road], 2.0, 0.2, 0.8).unwrap();
    // Tail at 2.3, 0.3 ahead of our head
    let leader = AgentState::placed(AgentId(1), vec![road], 3.1, 0.0, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&leader]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);
}

/// Test that a distant leader at the same speed does not cause braking
#[test]
fn test_distant_leader_ignored() {
    let network = build(STRAIGHT_ROAD);
    let road = edge(&network, 1, 2);
    let mut me = agent(&network, 0, 1, 3, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![road], 2.0, 0.2, 0.8).unwrap();
    let leader = AgentState::placed(AgentId(1), vec![road], 9.8, 0.2, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&leader]), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
}

/// Test that a stopped leader just past the next node is seen
#[test]
fn test_brakes_for_leader_on_next_edge() {
    let network = build(STRAIGHT_ROAD);
    let mut me = agent(&network, 0, 1, 3, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 2)], 9.5, 0.2, 0.8).unwrap();
    // Tail at 0.1 on the next edge, 0.6 ahead of our head
    let leader = AgentState::placed(AgentId(1), vec![edge(&network, 2, 3)], 0.9, 0.0, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&leader]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);
}

/// Test that the route edge the head entered is consumed
#[test]
fn test_decide_consumes_entered_edge() {
    let network = build(STRAIGHT_ROAD);
    let mut me = agent(&network, 0, 1, 3, driver(0.5));
    let first = edge(&network, 1, 2);
    let last = edge(&network, 2, 3);

    let state = AgentState::placed(AgentId(0), vec![first], 9.9, 0.2, 0.8).unwrap();
    let decision = me.decide(&CrossroadSnapshot::new(&state, Vec::<&AgentState>::new()), &network);
    assert_eq!(decision.next_edge, Some(last));

    let state = AgentState::placed(AgentId(0), vec![last, first], 0.5, 0.2, 0.8).unwrap();
    let decision = me.decide(&CrossroadSnapshot::new(&state, Vec::<&AgentState>::new()), &network);
    assert_eq!(decision.next_edge, None);
    assert_eq!(me.remaining_route().count(), 0);
}

/// Test that an agent close to a crossing yields to traffic from the right
#[test]
fn test_yields_to_right_hand_traffic() {
    let network = build(FOUR_WAY);
    let mut me = agent(&network, 0, 1, 5, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.6, 0.2, 0.8).unwrap();
    // One unit from the crossing at 0.2 per tick: arrives in 5 ticks
    let right = AgentState::placed(AgentId(1), vec![edge(&network, 4, 0)], 9.0, 0.2, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&right]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);
}

/// Test that traffic from the left does not have priority
#[test]
fn test_ignores_left_hand_traffic() {
    let network = build(FOUR_WAY);
    let mut me = agent(&network, 0, 1, 5, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.6, 0.2, 0.8).unwrap();
    let left = AgentState::placed(AgentId(1), vec![edge(&network, 2, 0)], 9.0, 0.2, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&left]), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
}

/// Test that a mad driver waits less for right-hand traffic
#[test]
fn test_madness_shortens_yield_time() {
    let network = build(FOUR_WAY);
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.6, 0.2, 0.8).unwrap();
    // Seven ticks from the crossing
    let right = AgentState::placed(AgentId(1), vec![edge(&network, 4, 0)], 8.6, 0.2, 0.8).unwrap();

    let mut calm = agent(&network, 0, 1, 5, driver(0.5));
    let decision = calm.decide(&CrossroadSnapshot::new(&state, [&right]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);

    let mut mad = agent(&network, 0, 1, 5, driver(1.0));
    let decision = mad.decide(&CrossroadSnapshot::new(&state, [&right]), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
}

/// Test that an agent far from the crossing does not yield yet
#[test]
fn test_distant_crossing_skips_right_of_way() {
    let network = build(FOUR_WAY);
    let mut me = agent(&network, 0, 1, 5, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 2.0, 0.2, 0.8).unwrap();
    let right = AgentState::placed(AgentId(1), vec![edge(&network, 4, 0)], 9.0, 0.2, 0.8).unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&right]), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
}

/// Test that an agent brakes when a vehicle sits in the node ahead
#[test]
fn test_brakes_for_vehicle_in_next_node() {
    let network = build(FOUR_WAY);
    let mut me = agent(&network, 0, 1, 5, driver(0.5));
    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.8, 0.2, 0.8).unwrap();
    // Spans the crossing from the east towards the north exit
    let crossing = AgentState::placed(
        AgentId(1),
        vec![edge(&network, 0, 7), edge(&network, 2, 0)],
        0.3,
        0.0,
        0.8,
    )
    .unwrap();

    let decision = me.decide(&CrossroadSnapshot::new(&state, [&crossing]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);
}

/// Test that an agent stops short of a crossing whose exit is blocked
#[test]
fn test_does_not_block_the_crossing() {
    let network = build(FOUR_WAY);
    let mut cautious = driver(0.5);
    cautious.safe_distance_stationary = 0.5;
    let exit = edge(&network, 0, 5);

    let state = AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.6, 0.0, 0.8).unwrap();
    // Stopped with its tail 1.0 into our exit
    let blocker = AgentState::placed(AgentId(1), vec![exit], 1.8, 0.0, 0.8).unwrap();
    let mut me = agent(&network, 0, 1, 5, cautious);
    let decision = me.decide(&CrossroadSnapshot::new(&state, [&blocker]), &network);
    assert_eq!(decision.acceleration, Acceleration::Brake);

    // Enough room behind it
    let blocker = AgentState::placed(AgentId(1), vec![exit], 2.8, 0.0, 0.8).unwrap();
    let mut me = agent(&network, 0, 1, 5, cautious);
    let decision = me.decide(&CrossroadSnapshot::new(&state, [&blocker]), &network);
    assert_eq!(decision.acceleration, Acceleration::Accelerate);
}

/// Test that decisions do not depend on the order agents are evaluated in
#[test]
fn test_decisions_are_order_independent() {
    let network = build(FOUR_WAY);
    let states = vec![
        AgentState::placed(AgentId(0), vec![edge(&network, 1, 0)], 9.6, 0.2, 0.8).unwrap(),
        AgentState::placed(AgentId(1), vec![edge(&network, 4, 0)], 9.0, 0.2, 0.8).unwrap(),
        AgentState::placed(AgentId(2), vec![edge(&network, 2, 0)], 8.0, 0.15, 0.8).unwrap(),
    ];
    let agents = vec![
        agent(&network, 0, 1, 5, driver(0.5)),
        agent(&network, 1, 4, 6, driver(0.5)),
        agent(&network, 2, 2, 7, driver(0.5)),
    ];

    let forward: Vec<_> = (0..states.len())
        .map(|index| {
            let mut me = agents[index].clone();
            me.decide(&CrossroadSnapshot::for_agent(&states, index), &network)
        })
        .collect();
    let mut backward: Vec<_> = (0..states.len())
        .rev()
        .map(|index| {
            let mut me = agents[index].clone();
            me.decide(&CrossroadSnapshot::for_agent(&states, index), &network)
        })
        .collect();
    backward.reverse();

    assert_eq!(forward, backward);
    assert_eq!(forward[0].acceleration, Acceleration::Brake);
}
