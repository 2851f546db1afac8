use anyhow::Context;
use tokio::sync::mpsc;
use tracing::*;
use tracing_subscriber::FmtSubscriber;

use pwrmon::channel::ChipId;
use pwrmon::config::MeasurementRequest;
use pwrmon::monitor::PowerMonitor;
use pwrmon::monitor::backend::sim::Sim;
use pwrmon::sampler_task::run_sampler;

/// Application & Tokio executor entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default tracing subscriber failed");

    // A measurement request may be supplied as a JSON file path; otherwise
    // monitor every rail at a comfortable default rate.
    let request = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading measurement request from {path}"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing measurement request from {path}"))?
        }
        None => MeasurementRequest {
            channels: 0x3F,
            op_mode: 2,
            shunt_conv_time: 4,
            bus_conv_time: 4,
            sample_count: 3,
        },
    };

    // The timer event queue: non-blocking posts from the timer tasks, one
    // blocking consumer. Capacity matches the at-most-one-pending-event-
    // per-session contract.
    let (event_tx, event_rx) = mpsc::channel(ChipId::ALL.len());

    let mut monitor = PowerMonitor::new(Sim, event_tx);
    monitor.init().await?;
    monitor.start_measurement(&request).await?;

    // The sampler task owns the monitor from here on
    info!("measurement started, handing the monitor to the sampler task");
    run_sampler(monitor, event_rx).await;
    Ok(())
}
