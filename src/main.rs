use anyhow::Result;
use clap::Parser;
use log::info;
use rand::Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crossroad_sim::report::{save_reports, RunReport};
use crossroad_sim::simulation::{
    load_network, run_batch, ProgressLogger, SimulationSettings, Simulator, DEFAULT_REPLICAS,
};

#[derive(Parser)]
#[command(name = "crossroad_sim")]
#[command(about = "Traffic simulation of a road-graph intersection")]
struct Cli {
    /// Network description (JSON with nodes and edges)
    network_file: PathBuf,

    /// Run many replicas in parallel and report their aggregate
    #[arg(long)]
    batch: bool,

    /// Number of simulation ticks per run
    #[arg(long, default_value = "5000")]
    ticks: u32,

    /// Spawn rate; a spawn succeeds with probability traffic / 10 each tick
    #[arg(long, default_value = "0.01")]
    traffic: f32,

    /// Mean driver madness in [0, 1]
    #[arg(long, default_value = "0.5")]
    craziness: f32,

    /// Number of replicas in batch mode
    #[arg(long, default_value_t = DEFAULT_REPLICAS)]
    replicas: usize,

    /// Base seed; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// File the run line is appended to
    #[arg(long, default_value = "results.txt")]
    results: PathBuf,

    /// File the per-route lines are written to
    #[arg(long, default_value = "route_results.txt")]
    route_results: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting...");
    let settings = SimulationSettings {
        ticks: cli.ticks,
        traffic: cli.traffic,
        craziness: cli.craziness,
        batch_mode: cli.batch,
        replicas: cli.replicas,
        seed: cli.seed.unwrap_or_else(|| rand::rng().random()),
        network_file: cli.network_file,
        log_collisions: !cli.batch,
    };
    settings.validate()?;
    info!("Seed: {}", settings.seed);

    let network = Arc::new(load_network(&settings.network_file)?);

    let report = if settings.batch_mode {
        let (batch, _) = run_batch(network, &settings)?;
        info!(
            "Batch of {} replicas: average velocity {}, median waiting time {}, median queue length {}",
            batch.replicas,
            batch.average_velocity,
            batch.average_waiting_time,
            batch.average_queue_length
        );
        RunReport::from(&batch)
    } else {
        let mut simulator = Simulator::new(network, settings.clone(), settings.seed)?;
        simulator.register_observer(Box::new(ProgressLogger::new(100)));
        let statistics = simulator.run()?;
        statistics.log_summary();
        RunReport::from(&statistics)
    };

    save_reports(&cli.results, &cli.route_results, &settings, &report)?;
    info!(
        "Results written to {} and {}",
        cli.results.display(),
        cli.route_results.display()
    );
    Ok(())
}
