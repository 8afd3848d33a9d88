//! Port traits: the boundary between the pulse engine and the hardware.
//!
//! ```text
//!   Engine ──▶ PulseTimer        (one-shot countdown, expiry → on_timer_expiry)
//!   Engine ──▶ OutputPort        (per-pin digital level)
//!   Engine ──▶ EdgeInterruptPort (zero-cross input, edge → on_zero_cross)
//! ```
//!
//! Adapters implement these for a concrete MCU; tests implement them with
//! recording mocks.  Every method here may be called from interrupt
//! context, so implementations must not block or allocate.

use crate::error::Result;

/// Identifier of a physical GPIO.
pub type PinId = u8;

// ───────────────────────────────────────────────────────────────
// Timer port
// ───────────────────────────────────────────────────────────────

/// A single hardware countdown timer driving the engine.
///
/// When an armed delay elapses the platform glue must call
/// [`Engine::on_timer_expiry`](crate::app::engine::Engine::on_timer_expiry).
pub trait PulseTimer {
    /// Timer resolution, in ticks per second.
    fn ticks_per_second(&self) -> u32;

    /// Load a one-shot delay and start counting.
    fn arm(&mut self, delay_ticks: u32);

    /// Stop counting; a pending expiry must not fire afterwards.
    fn stop(&mut self);

    /// Reset the running counter so the next `arm` starts from zero.
    fn reset_counter(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Digital output port
// ───────────────────────────────────────────────────────────────

/// Drives output pins.  `high` is the physical level; the engine has
/// already applied each channel's inversion.
pub trait OutputPort {
    fn set_level(&mut self, pin: PinId, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Edge interrupt port
// ───────────────────────────────────────────────────────────────

/// Which input transition raises the zero-cross interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Rising,
    Falling,
    AnyEdge,
}

/// Configures an input pin to interrupt on an edge.
///
/// The platform glue routes that interrupt to
/// [`Engine::on_zero_cross`](crate::app::engine::Engine::on_zero_cross).
/// Called once from task context during setup, unlike the ports above.
pub trait EdgeInterruptPort {
    /// Returns an error if the interrupt will not fire.
    fn configure_edge_interrupt(&mut self, pin: PinId, edge: EdgeType) -> Result<()>;
}
