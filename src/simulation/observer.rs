//! Tick observers
//!
//! Observers are notified after every tick and pull whatever state they
//! need through the simulator's accessors.

use log::info;

use super::simulator::Simulator;

pub trait TickObserver: Send {
    fn on_tick(&mut self, simulator: &Simulator);
}

/// Logs run progress every `interval` ticks
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    interval: u32,
}

impl ProgressLogger {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl TickObserver for ProgressLogger {
    fn on_tick(&mut self, simulator: &Simulator) {
        let tick = simulator.tick();
        if tick % self.interval != 0 {
            return;
        }
        let horizon = simulator.settings().ticks.max(1);
        info!(
            "Simulation progress: {:.2}% ({} active, {} queued, {} collisions)",
            tick as f32 / horizon as f32 * 100.0,
            simulator.states().len(),
            simulator.queued_count(),
            simulator.collision_count()
        );
    }
}
