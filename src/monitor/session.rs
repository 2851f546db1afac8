use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::channel::ChipId;
use crate::register::RegisterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Chip is in its power-on default state, nothing armed.
    Idle,
    /// Chip is configured and its recurring timer is armed.
    Armed,
    /// A reset failed; the chip's state cannot be trusted and the session
    /// refuses further configuration until it is manually reinitialized.
    Unknown,
}

/// Per-chip scheduling state, one per physical chip for the process lifetime.
///
/// Single-writer by construction: the caller context writes during
/// configure/reset, the sampler task writes during cycle processing, and the
/// two phases never overlap because the monitor moves into the sampler task.
#[derive(Debug)]
pub struct DeviceSession {
    pub(crate) chip: ChipId,
    pub(crate) state: SessionState,
    pub(crate) config: Option<RegisterConfig>,
    pub(crate) interval: Option<Duration>,
    /// The session's one pre-allocated event slot: set by the timer context
    /// before posting, cleared by the sampler when the event is drained.
    /// Redundant timer fires coalesce on this flag instead of piling up in
    /// the queue.
    pub(crate) pending: Arc<AtomicBool>,
}

impl DeviceSession {
    pub(crate) fn new(chip: ChipId) -> Self {
        DeviceSession {
            chip,
            state: SessionState::Idle,
            config: None,
            interval: None,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn chip(&self) -> ChipId {
        self.chip
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The armed measurement interval, `None` while idle or stale.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub(crate) fn clear(&mut self) {
        self.config = None;
        self.interval = None;
        self.pending
            .store(false, std::sync::atomic::Ordering::Release);
    }
}
