//! Power monitor core: two device sessions, the configure/rollback protocol
//! and the timer-driven sampling cycle.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::*;

use crate::channel::{CHANNELS_PER_CHIP, Channel, ChipChannels, ChipId};
use crate::config::{MeasurementParams, MeasurementRequest, RequestError};
use crate::interval::measurement_interval;
use crate::register::RegisterConfig;

pub mod backend;
pub mod session;

use self::backend::sensor_bus::{SensorBus, SensorBusError};
use self::session::{DeviceSession, SessionState};

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    #[error("failed to initialize {chip}: {source}")]
    Init { chip: ChipId, source: SensorBusError },
    #[error("{chip} rejected its configuration: {source}")]
    HardwareConfig {
        chip: ChipId,
        source: SensorBusError,
        /// Chips whose rollback reset also failed; a secondary warning that
        /// never masks the original failure.
        rollback_failures: Vec<ChipId>,
    },
    #[error("no channels enabled for {chip}")]
    NoChannelsEnabled { chip: ChipId },
    #[error("{chip} needs manual reinitialization after a failed reset")]
    NeedsReinit { chip: ChipId },
}

/// Owns the sensor bus and both device sessions.
///
/// The caller context configures measurements, then moves the monitor into
/// the sampler task, which is the only writer from then on.
pub struct PowerMonitor<B: SensorBus> {
    bus: B,
    sessions: [DeviceSession; 2],
    event_tx: mpsc::Sender<ChipId>,
}

impl<B: SensorBus> PowerMonitor<B> {
    pub fn new(bus: B, event_tx: mpsc::Sender<ChipId>) -> Self {
        PowerMonitor {
            bus,
            sessions: ChipId::ALL.map(DeviceSession::new),
            event_tx,
        }
    }

    pub fn session(&self, chip: ChipId) -> &DeviceSession {
        &self.sessions[chip.index()]
    }

    /// Bring both chips up in their power-on default state.
    pub async fn init(&mut self) -> Result<(), MonitorError> {
        for chip in ChipId::ALL {
            self.bus
                .init(chip)
                .await
                .map_err(|source| MonitorError::Init { chip, source })?;
            info!("initialized {chip}");
        }
        Ok(())
    }

    /// Validate a measurement request and arm every chip it selects.
    ///
    /// An empty channel mask is a documented no-op: the request succeeds and
    /// no hardware is touched. A chip whose subset of the mask is empty keeps
    /// whatever state it had. If any chip fails to accept its configuration,
    /// every chip attempted in this call is reset before the error returns,
    /// so the call never ends with only one chip armed.
    pub async fn start_measurement(
        &mut self,
        request: &MeasurementRequest,
    ) -> Result<(), MonitorError> {
        let params = request.validate()?;
        if params.channels.is_empty() {
            info!("empty channel mask, nothing to configure");
            return Ok(());
        }

        let subsets = params.channels.split();
        let mut attempted = Vec::new();
        for chip in ChipId::ALL {
            let subset = subsets[chip.index()];
            if subset.is_empty() {
                continue;
            }
            attempted.push(chip);
            if let Err(err) = Self::configure(
                &mut self.bus,
                &mut self.sessions[chip.index()],
                subset,
                &params,
                &self.event_tx,
            )
            .await
            {
                let failures = Self::rollback(&mut self.bus, &mut self.sessions, &attempted).await;
                return Err(match err {
                    MonitorError::HardwareConfig { chip, source, .. } => {
                        MonitorError::HardwareConfig {
                            chip,
                            source,
                            rollback_failures: failures,
                        }
                    }
                    other => other,
                });
            }
            info!(
                "{chip} armed with interval {:?}",
                self.sessions[chip.index()].interval
            );
        }
        Ok(())
    }

    /// Configure one chip and arm its timer.
    async fn configure(
        bus: &mut B,
        session: &mut DeviceSession,
        subset: ChipChannels,
        params: &MeasurementParams,
        event_tx: &mpsc::Sender<ChipId>,
    ) -> Result<(), MonitorError> {
        if session.state == SessionState::Unknown {
            return Err(MonitorError::NeedsReinit { chip: session.chip });
        }

        let config = RegisterConfig::new(
            subset,
            params.op_mode.into(),
            params.sadc,
            params.badc,
            params.samples,
        );
        let interval = measurement_interval(config);
        if interval.is_zero() {
            return Err(MonitorError::NoChannelsEnabled { chip: session.chip });
        }

        if let Err(source) = bus.write_config(session.chip, config).await {
            // Stale-mark the session; the caller rolls back with reset().
            session.clear();
            return Err(MonitorError::HardwareConfig {
                chip: session.chip,
                source,
                rollback_failures: Vec::new(),
            });
        }

        session.config = Some(config);
        session.interval = Some(interval);
        session.state = SessionState::Armed;
        arm_timer(session, interval, event_tx.clone());
        Ok(())
    }

    /// Best-effort reset of every chip attempted in a failed call.
    ///
    /// Returns the chips whose reset itself failed; those sessions are left
    /// in [`SessionState::Unknown`] and refuse configuration until manually
    /// reinitialized.
    async fn rollback(
        bus: &mut B,
        sessions: &mut [DeviceSession; 2],
        attempted: &[ChipId],
    ) -> Vec<ChipId> {
        let mut failures = Vec::new();
        for &chip in attempted {
            let session = &mut sessions[chip.index()];
            session.clear();
            match bus.reset(chip).await {
                Ok(()) => {
                    session.state = SessionState::Idle;
                    info!("rolled back {chip} to power-on defaults");
                }
                Err(err) => {
                    session.state = SessionState::Unknown;
                    error!("rollback reset of {chip} failed: {err}");
                    failures.push(chip);
                }
            }
        }
        failures
    }

    /// One sampling cycle, run on the sampler task when a session's timer
    /// event is drained: read every enabled channel, then re-arm the timer
    /// for the stored interval. Fixed-period re-arm, drift is accepted.
    pub async fn handle_timer_fired(&mut self, chip: ChipId) {
        let session = &self.sessions[chip.index()];
        session.pending.store(false, Ordering::Release);

        let (Some(config), Some(interval)) = (session.config, session.interval) else {
            warn!("timer fired for unconfigured {chip}, dropping event");
            return;
        };

        let channels = config.channels();
        for ch in 0..CHANNELS_PER_CHIP {
            if !channels.contains(ch) {
                continue;
            }
            match self.bus.read_channel(chip, ch).await {
                Ok(reading) => {
                    let rail = Channel::from_bit(chip.shift() + ch);
                    info!("{chip} channel {ch} ({rail:?}): {reading:?}");
                }
                Err(err) => {
                    warn!("failed to read {chip} channel {ch}: {err}");
                }
            }
        }

        arm_timer(&self.sessions[chip.index()], interval, self.event_tx.clone());
    }
}

/// Arm a session's one-shot timer.
///
/// The expiry runs on a spawned timer task, the producer side of the event
/// queue: it only sets the session's pending slot and posts the chip id,
/// never blocking. A fire that finds the slot already set is coalesced.
fn arm_timer(session: &DeviceSession, interval: Duration, event_tx: mpsc::Sender<ChipId>) {
    let chip = session.chip;
    let pending = Arc::clone(&session.pending);
    tokio::spawn(async move {
        tokio::time::sleep(interval).await;
        if pending.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = event_tx.try_send(chip) {
            pending.store(false, Ordering::Release);
            warn!("unable to post timer event for {chip}: {err}");
        }
    });
}
