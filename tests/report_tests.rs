use crossroad_sim::report::{write_route_lines, write_run_line, RunReport};
use crossroad_sim::simulation::{RouteStatistics, SimulationSettings, SimulationStatistics};

fn statistics() -> SimulationStatistics {
    let mut statistics = SimulationStatistics {
        average_velocity: 0.125,
        average_waiting_time: 3.0,
        average_driving_time: 40.0,
        average_queue_length: 0.5,
        collisions: 1,
        agents: 12,
        ticks: 100,
        ..Default::default()
    };
    statistics.routes.insert(
        (2, 9),
        RouteStatistics {
            average_velocity: 0.25,
            agents: 3.0,
        },
    );
    statistics.routes.insert(
        (1, 9),
        RouteStatistics {
            average_velocity: 0.5,
            agents: 2.0,
        },
    );
    statistics
}

/// Test that a run line carries the settings followed by the statistics
#[test]
fn test_run_line() {
    let settings = SimulationSettings {
        ticks: 100,
        traffic: 0.5,
        craziness: 0.25,
        ..Default::default()
    };
    let report = RunReport::from(&statistics());

    let mut buffer = Vec::new();
    write_run_line(&mut buffer, &settings, &report).unwrap();
    let line = String::from_utf8(buffer).unwrap();

    assert_eq!(line, "100\t0.5\t0.25\t0.125\t3\t40\t0.5\t1\t12\n");
}

/// Test that route lines are ordered by origin and destination
#[test]
fn test_route_lines() {
    let report = RunReport::from(&statistics());

    let mut buffer = Vec::new();
    write_route_lines(&mut buffer, &report).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert_eq!(text, "1\t9\t0.5\t2\n2\t9\t0.25\t3\n");
}
