use tokio::sync::mpsc;
use tracing::*;

use crate::channel::ChipId;
use crate::monitor::PowerMonitor;
use crate::monitor::backend::sensor_bus::SensorBus;

/// Dedicated sampling scheduler: the single consumer of the timer event
/// queue and, from the moment it takes the monitor, its only writer.
///
/// Each drained event names the session whose timer fired; the monitor reads
/// that chip's enabled channels and re-arms the timer, giving a steady-state
/// period equal to the session's computed measurement interval.
pub async fn run_sampler<B: SensorBus>(
    mut monitor: PowerMonitor<B>,
    mut events: mpsc::Receiver<ChipId>,
) {
    while let Some(chip) = events.recv().await {
        monitor.handle_timer_fired(chip).await;
    }
    info!("timer event queue closed, sampler exiting");
}
