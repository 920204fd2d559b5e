//! Result files
//!
//! Run results are appended one line per run, prefixed by the settings that
//! produced them. Route results are rewritten on every run. Both files are
//! tab-separated without headers.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::simulation::{
    BatchStatistics, RouteKey, RouteStatistics, SimulationSettings, SimulationStatistics,
};

/// One line of the run report
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub average_velocity: f32,
    pub average_waiting_time: f32,
    pub average_driving_time: f32,
    pub queue_length: f32,
    pub collisions: f32,
    pub agents: f32,
    pub routes: BTreeMap<RouteKey, RouteStatistics>,
}

impl From<&SimulationStatistics> for RunReport {
    fn from(stats: &SimulationStatistics) -> Self {
        Self {
            average_velocity: stats.average_velocity,
            average_waiting_time: stats.average_waiting_time,
            average_driving_time: stats.average_driving_time,
            queue_length: stats.average_queue_length,
            collisions: stats.collisions as f32,
            agents: stats.agents as f32,
            routes: stats.routes.clone(),
        }
    }
}

impl From<&BatchStatistics> for RunReport {
    fn from(stats: &BatchStatistics) -> Self {
        Self {
            average_velocity: stats.average_velocity,
            average_waiting_time: stats.average_waiting_time,
            average_driving_time: stats.average_driving_time,
            queue_length: stats.average_queue_length,
            collisions: stats.collisions,
            agents: stats.agents,
            routes: stats.routes.clone(),
        }
    }
}

fn tab_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

/// Writes the settings and run statistics as one line
pub fn write_run_line<W: Write>(
    writer: W,
    settings: &SimulationSettings,
    report: &RunReport,
) -> Result<()> {
    let mut writer = tab_writer(writer);
    writer.write_record([
        settings.ticks.to_string(),
        settings.traffic.to_string(),
        settings.craziness.to_string(),
        report.average_velocity.to_string(),
        report.average_waiting_time.to_string(),
        report.average_driving_time.to_string(),
        report.queue_length.to_string(),
        report.collisions.to_string(),
        report.agents.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Writes one line per route, ordered by (origin, destination)
pub fn write_route_lines<W: Write>(writer: W, report: &RunReport) -> Result<()> {
    let mut writer = tab_writer(writer);
    for ((origin, destination), route) in &report.routes {
        writer.write_record([
            origin.to_string(),
            destination.to_string(),
            route.average_velocity.to_string(),
            route.agents.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends the run line to `results` and rewrites `route_results`
pub fn save_reports(
    results: &Path,
    route_results: &Path,
    settings: &SimulationSettings,
    report: &RunReport,
) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(results)
        .with_context(|| format!("Failed to open results file {}", results.display()))?;
    write_run_line(file, settings, report)
        .with_context(|| format!("Failed to write results file {}", results.display()))?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(route_results)
        .with_context(|| {
            format!("Failed to open route results file {}", route_results.display())
        })?;
    write_route_lines(file, report).with_context(|| {
        format!("Failed to write route results file {}", route_results.display())
    })?;
    Ok(())
}
