//! Crossroad Traffic Simulation Library
//!
//! Simulates agents driving through an arbitrary road-graph intersection
//! and collects throughput and safety statistics.

pub mod report;
pub mod simulation;
