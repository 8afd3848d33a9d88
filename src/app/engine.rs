//! Engine controller: the public lifecycle and configuration API.
//!
//! [`Engine`] owns the timer, the output pins, the channel registry and
//! the scheduler state.  It is an explicit handle: firmware creates one per
//! hardware timer and routes both interrupts to it.
//!
//! ```text
//!  task context ──▶ pause() ──▶ PauseGuard ──▶ mutate channels / timing
//!                                    │ drop
//!                                    ▼
//!                         re-arm one tick out if it was running
//!
//!  timer ISR ──▶ on_timer_expiry() ──▶ EngineState::step(&[Channel]) ──▶ arm(delay)
//!  edge ISR  ──▶ on_zero_cross()   ──▶ restart ramp ──▶ arm(1)
//! ```
//!
//! Channel data is only ever mutated through a [`PauseGuard`], so the
//! worker never sees a half-written threshold table.  Duty and dithering
//! updates only hold the timer: progress, the sub-frame index and the pin
//! levels carry on where they were, so frequent updates never cut the
//! dither cycle short.  Changing the frequency rewinds to the top of the
//! super-cycle, like [`Engine::stop`].

use log::{debug, info, warn};

use crate::channel::{Channel, ChannelRegistry};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::scheduler::EngineState;
use crate::zero_cross::SyncStatus;

use super::commands::PwmAction;
use super::ports::{EdgeInterruptPort, EdgeType, OutputPort, PinId, PulseTimer};

fn max_load_for(ticks_per_second: u32, frequency_hz: u16) -> u32 {
    ticks_per_second / u32::from(frequency_hz)
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Software PWM engine for up to `N` channels.
pub struct Engine<T: PulseTimer, O: OutputPort, const N: usize> {
    timer: T,
    outputs: O,
    channels: ChannelRegistry<N>,
    state: EngineState,
    frequency_hz: u16,
}

impl<T: PulseTimer, O: OutputPort, const N: usize> Engine<T, O, N> {
    /// Build a stopped engine.
    ///
    /// A zero frequency in `config` falls back to the default.
    pub fn new(timer: T, outputs: O, config: EngineConfig) -> Self {
        let frequency_hz = if config.frequency_hz == 0 {
            warn!("engine: configured frequency is 0 Hz, using default");
            EngineConfig::default().frequency_hz
        } else {
            config.frequency_hz
        };
        let max_load = max_load_for(timer.ticks_per_second(), frequency_hz);

        info!(
            "engine: {} channel slots, {} Hz (max_load={} ticks)",
            N, frequency_hz, max_load
        );

        Self {
            timer,
            outputs,
            channels: ChannelRegistry::new(),
            state: EngineState::new(max_load, config.halve_delay_after_zero_cross),
            frequency_hz,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start generating pulses.  The first evaluation runs one tick later.
    pub fn start(&mut self) {
        if self.state.is_running() {
            debug!("engine: start ignored, already running");
            return;
        }
        self.resume();
        info!("engine: started ({} channels)", self.channels.len());
    }

    /// Stop the timer and drive every channel to its inactive level.
    pub fn stop(&mut self) {
        self.halt();
        info!("engine: stopped");
    }

    fn resume(&mut self) {
        self.timer.reset_counter();
        self.timer.arm(1);
        self.state.set_running(true);
    }

    fn halt(&mut self) {
        self.timer.stop();
        self.state.rewind();
        for channel in self.channels.iter() {
            self.outputs.set_level(channel.pin(), channel.level(false));
        }
        self.state.set_running(false);
    }

    /// Hold the timer (if running) until the returned guard is dropped.
    ///
    /// Progress, sub-frame and pin levels are kept; on drop the worker runs
    /// one tick later and continues from the same position.
    pub fn pause(&mut self) -> PauseGuard<'_, T, O, N> {
        let resume = self.state.is_running();
        if resume {
            self.timer.stop();
            self.state.set_running(false);
        }
        PauseGuard {
            engine: self,
            resume,
        }
    }

    /// Like [`pause`](Self::pause), but rewinds to the top of the
    /// super-cycle with every pin inactive.
    fn pause_and_rewind(&mut self) -> PauseGuard<'_, T, O, N> {
        let resume = self.state.is_running();
        if resume {
            self.halt();
        }
        PauseGuard {
            engine: self,
            resume,
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Change the PWM frequency (one sub-frame per period).
    pub fn set_frequency(&mut self, frequency_hz: u16) -> Result<()> {
        if frequency_hz == 0 {
            warn!("engine: rejected frequency of 0 Hz");
            return Err(Error::InvalidFrequency(frequency_hz));
        }
        let max_load = max_load_for(self.timer.ticks_per_second(), frequency_hz);

        let mut guard = self.pause_and_rewind();
        guard.engine.state.set_max_load(max_load);
        guard.engine.frequency_hz = frequency_hz;
        drop(guard);

        info!("engine: frequency {} Hz (max_load={} ticks)", frequency_hz, max_load);
        Ok(())
    }

    /// Register an output channel.  A pin that is already registered is
    /// left untouched.
    pub fn create_channel(
        &mut self,
        pin: PinId,
        inverted: bool,
        leading: bool,
        dithering: u16,
        initial_duty: u16,
    ) -> Result<()> {
        if self.channels.contains(pin) {
            debug!("engine: GPIO{} already has a channel", pin);
            return Ok(());
        }

        let channel = Channel::new(pin, inverted, leading, dithering, initial_duty);
        let idle_level = channel.level(false);

        let mut guard = self.pause();
        if let Err(e) = guard.channels_mut().push(channel) {
            warn!("engine: no free channel slot for GPIO{}", pin);
            return Err(e);
        }
        guard.engine.outputs.set_level(pin, idle_level);
        drop(guard);

        info!(
            "engine: channel GPIO{} (inverted={}, leading={}, dithering={}, duty={})",
            pin, inverted, leading, dithering, initial_duty
        );
        Ok(())
    }

    /// Set a channel's duty using its stored dithering amount.
    pub fn set_duty(&mut self, pin: PinId, duty: u16) {
        self.update_channel(pin, |channel| channel.set_duty(duty));
    }

    /// Store a new dithering amount.  It takes effect on the next
    /// [`set_duty`](Self::set_duty); current thresholds are kept.
    pub fn set_dithering(&mut self, pin: PinId, amount: u16) {
        self.update_channel(pin, |channel| channel.set_dithering(amount));
    }

    /// Store a dithering amount and recompute the thresholds for `duty`.
    pub fn set_duty_dithered(&mut self, pin: PinId, duty: u16, dithering: u16) {
        self.update_channel(pin, |channel| {
            channel.set_dithering(dithering);
            channel.set_duty(duty);
        });
    }

    /// Apply a firmware PWM action: optional frequency change, then duty.
    pub fn apply_action(&mut self, action: &PwmAction) -> Result<()> {
        if let Some(frequency_hz) = action.frequency_hz.filter(|&hz| hz != self.frequency_hz) {
            self.set_frequency(frequency_hz)?;
        }
        self.set_duty_dithered(action.pin, action.duty, action.dithering);
        Ok(())
    }

    fn update_channel(&mut self, pin: PinId, f: impl FnOnce(&mut Channel)) {
        if !self.channels.contains(pin) {
            debug!("engine: no channel on GPIO{}", pin);
            return;
        }
        let mut guard = self.pause();
        if let Some(channel) = guard.channels_mut().get_mut(pin) {
            f(channel);
        }
    }

    /// Phase-lock to an AC zero-cross signal on `pin`.
    ///
    /// If the edge interrupt cannot be configured the engine keeps
    /// free-running and the port's error is returned.
    pub fn enable_zero_cross(
        &mut self,
        input: &mut impl EdgeInterruptPort,
        pin: PinId,
        edge: EdgeType,
    ) -> Result<()> {
        let mut guard = self.pause();
        guard.engine.state.zero_cross_mut().enable(input, pin, edge)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Approximate nominal duty of a channel.
    pub fn get_duty(&self, pin: PinId) -> Option<u16> {
        self.channels.get(pin).map(Channel::duty)
    }

    pub fn get_dithering(&self, pin: PinId) -> Option<u16> {
        self.channels.get(pin).map(Channel::dithering)
    }

    pub fn channel(&self, pin: PinId) -> Option<&Channel> {
        self.channels.get(pin)
    }

    pub fn channels(&self) -> &[Channel] {
        self.channels.as_slice()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn frequency_hz(&self) -> u16 {
        self.frequency_hz
    }

    pub fn max_load(&self) -> u32 {
        self.state.max_load()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.state.sync_status()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    // ── Interrupt entry points ────────────────────────────────

    /// Timer expiry.  Interrupt context: no logging, no allocation.
    pub fn on_timer_expiry(&mut self) {
        if !self.state.is_running() {
            return;
        }
        if let Some(delay) = self.state.step(self.channels.as_slice(), &mut self.outputs) {
            self.timer.arm(delay);
        }
    }

    /// Zero-cross edge.  Interrupt context: no logging, no allocation.
    ///
    /// Restarts the duty ramp at the crossing whatever the engine was doing.
    /// A stopped engine records the crossing but stays stopped.
    pub fn on_zero_cross(&mut self) {
        self.timer.stop();
        self.state.restart_ramp();
        if self.state.is_running() {
            self.timer.reset_counter();
            self.timer.arm(1);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// PauseGuard
// ───────────────────────────────────────────────────────────────

/// Scoped pause: the timer is held while this exists and re-armed on drop
/// if the engine was running when the guard was taken.
pub struct PauseGuard<'a, T: PulseTimer, O: OutputPort, const N: usize> {
    engine: &'a mut Engine<T, O, N>,
    resume: bool,
}

impl<T: PulseTimer, O: OutputPort, const N: usize> PauseGuard<'_, T, O, N> {
    /// Mutable access to channel data, only available while paused.
    pub fn channels_mut(&mut self) -> &mut ChannelRegistry<N> {
        &mut self.engine.channels
    }

    /// Set several duties under one pause.  Unknown pins are skipped.
    pub fn set_duties(&mut self, duties: impl IntoIterator<Item = (PinId, u16)>) {
        for (pin, duty) in duties {
            if let Some(channel) = self.engine.channels.get_mut(pin) {
                channel.set_duty(duty);
            }
        }
    }

    /// Whether the engine will be restarted when the guard drops.
    pub fn resumes(&self) -> bool {
        self.resume
    }
}

impl<T: PulseTimer, O: OutputPort, const N: usize> Drop for PauseGuard<'_, T, O, N> {
    fn drop(&mut self) {
        if self.resume {
            self.engine.resume();
        }
    }
}
