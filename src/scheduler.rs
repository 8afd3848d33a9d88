//! Event-driven transition scheduler (interrupt-context worker).
//!
//! Instead of ticking at a fixed rate, every timer expiry works out where
//! the next output transition across all channels falls and returns the
//! delay to it.  One sub-frame spans the 16-bit duty range; `max_load`
//! converts duty steps into timer ticks.
//!
//! ```text
//!   progress:  0 ───────── t₁ ───── t₂ ────────────── 65535
//!   timer:     │── Δ₁ ─────│── Δ₂ ──│── rest of period ──│
//!   pins:      all on      ch₁ off  ch₂ off             next sub-frame
//! ```
//!
//! The worker only reads channel data; it owns the progress counter, the
//! sub-frame index and the zero-cross lock.

use crate::app::ports::OutputPort;
use crate::channel::Channel;
use crate::config::{DUTY_MAX, SUB_FRAMES};
use crate::zero_cross::{SyncStatus, ZeroCrossSync};

/// Mutable control state of the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    progress: u16,
    sub_frame: u8,
    max_load: u32,
    running: bool,
    sync: ZeroCrossSync,
    halve_delay_after_zero_cross: bool,
}

impl EngineState {
    pub fn new(max_load: u32, halve_delay_after_zero_cross: bool) -> Self {
        Self {
            max_load,
            halve_delay_after_zero_cross,
            ..Self::default()
        }
    }

    /// Position inside the active sub-frame, in duty units.
    pub fn progress(&self) -> u16 {
        self.progress
    }

    pub fn sub_frame(&self) -> u8 {
        self.sub_frame
    }

    /// Timer ticks in one full, un-dithered period.
    pub fn max_load(&self) -> u32 {
        self.max_load
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn zero_cross(&self) -> &ZeroCrossSync {
        &self.sync
    }

    pub(crate) fn zero_cross_mut(&mut self) -> &mut ZeroCrossSync {
        &mut self.sync
    }

    pub(crate) fn set_max_load(&mut self, max_load: u32) {
        self.max_load = max_load;
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Rewind to the start of the super-cycle.
    pub(crate) fn rewind(&mut self) {
        self.progress = 0;
        self.sub_frame = 0;
    }

    /// Restart the duty ramp at a physical crossing.
    pub(crate) fn restart_ramp(&mut self) {
        self.progress = 0;
        self.sync.on_crossing();
    }

    /// Run one timer expiry.
    ///
    /// Drives the outputs for the current instant and returns the delay, in
    /// timer ticks, until the next transition.  `None` means the engine is
    /// phase-locked and must stay dormant until the next zero crossing.
    pub fn step(&mut self, channels: &[Channel], outputs: &mut impl OutputPort) -> Option<u32> {
        let synced = self.sync.status() == SyncStatus::Synced;

        if self.progress == 0 {
            self.sub_frame = (self.sub_frame + 1) % SUB_FRAMES as u8;
            for channel in channels {
                let threshold = channel.threshold(self.sub_frame);
                // While idling between crossings only full-on channels stay lit.
                let idle = threshold == 0
                    || (!channel.is_leading() && synced && threshold < DUTY_MAX);
                outputs.set_level(channel.pin(), channel.level(!idle));
            }
        }

        if synced {
            return None;
        }

        let from = self.progress;
        let mut next: Option<u16> = None;
        for channel in channels {
            let threshold = channel.threshold(self.sub_frame);
            if threshold <= from {
                outputs.set_level(channel.pin(), channel.level(false));
            } else if threshold < DUTY_MAX && next.is_none_or(|n| threshold < n) {
                next = Some(threshold);
            }
        }

        match next {
            Some(threshold) => {
                self.progress = threshold;
                Some(self.delay(threshold - from))
            }
            None => {
                self.progress = 0;
                if self.sync.complete_ramp() {
                    None
                } else {
                    Some(self.delay(DUTY_MAX - from))
                }
            }
        }
    }

    /// Convert a span of duty units into timer ticks (at least one).
    fn delay(&mut self, span: u16) -> u32 {
        let ticks = u64::from(span) * u64::from(self.max_load) / u64::from(DUTY_MAX);
        let mut ticks = (ticks.min(u64::from(u32::MAX)) as u32).max(1);
        if self.sync.take_crossing() && self.halve_delay_after_zero_cross {
            ticks = (ticks / 2).max(1);
        }
        ticks
    }
}
