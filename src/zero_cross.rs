//! AC zero-cross phase lock.
//!
//! ```text
//!   NotUsed ──enable()──▶ Armed ──all channels off──▶ Synced
//!                           ▲                           │
//!                           └──────── crossing ◀────────┘
//! ```
//!
//! In `NotUsed` the engine free-runs.  Once enabled, each physical crossing
//! restarts the duty ramp (`Armed`); when every channel has reached its
//! off-point the engine goes dormant (`Synced`) until the next crossing.

use log::{info, warn};

use crate::app::ports::{EdgeInterruptPort, EdgeType, PinId};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Free-running; AC phase is ignored.
    #[default]
    NotUsed,
    /// A crossing has been seen (or is awaited); the ramp is running.
    Armed,
    /// Ramp finished for this half-cycle; waiting for the next crossing.
    Synced,
}

#[derive(Debug, Clone, Default)]
pub struct ZeroCrossSync {
    status: SyncStatus,
    input: Option<(PinId, EdgeType)>,
    /// Set by a crossing, consumed by the first delay computed after it.
    crossing_pending: bool,
}

impl ZeroCrossSync {
    pub const fn new() -> Self {
        Self {
            status: SyncStatus::NotUsed,
            input: None,
            crossing_pending: false,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Input pin and edge the crossing interrupt was configured on.
    pub fn input(&self) -> Option<(PinId, EdgeType)> {
        self.input
    }

    /// Configure the crossing interrupt and start phase-locking.
    ///
    /// On failure nothing changes: without crossings a locked engine would
    /// go dormant after its first ramp and never wake up.
    pub fn enable(
        &mut self,
        port: &mut impl EdgeInterruptPort,
        pin: PinId,
        edge: EdgeType,
    ) -> Result<()> {
        if let Err(e) = port.configure_edge_interrupt(pin, edge) {
            warn!("zero-cross: GPIO{} not configured ({}), free-running", pin, e);
            return Err(e);
        }
        self.input = Some((pin, edge));
        self.status = SyncStatus::Armed;
        info!("zero-cross: enabled on GPIO{} ({:?})", pin, edge);
        Ok(())
    }

    /// A physical crossing happened.  Interrupt context.
    pub fn on_crossing(&mut self) {
        self.status = SyncStatus::Armed;
        self.crossing_pending = true;
    }

    /// Every channel reached its off-point for the current sub-frame.
    ///
    /// Returns `true` when this moves the lock from `Armed` to `Synced`,
    /// i.e. the engine must go dormant instead of re-arming the timer.
    pub fn complete_ramp(&mut self) -> bool {
        if self.status == SyncStatus::Armed {
            self.status = SyncStatus::Synced;
            true
        } else {
            false
        }
    }

    /// Whether a crossing happened since the last call.
    pub fn take_crossing(&mut self) -> bool {
        core::mem::take(&mut self.crossing_pending)
    }
}
