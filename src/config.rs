//! Engine configuration parameters
//!
//! Tunables applied when the engine is constructed.  The engine never
//! persists these; firmware that wants them stored embeds the struct in its
//! own settings blob.

use serde::{Deserialize, Serialize};

/// Full-scale duty value (always on).
pub const DUTY_MAX: u16 = u16::MAX;

/// Number of dither sub-frames in one super-cycle.
pub const SUB_FRAMES: usize = 8;

/// PWM frequency used until `set_frequency` is called.
pub const DEFAULT_FREQUENCY_HZ: u16 = 305;

/// Core engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// PWM frequency (one sub-frame per period)
    pub frequency_hz: u16,
    /// Halve the first transition delay after a zero-cross event.
    ///
    /// Off by default.  Kept as a knob for boards whose zero-cross detector
    /// reports the crossing late or asymmetrically between half-cycles.
    pub halve_delay_after_zero_cross: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            halve_delay_after_zero_cross: false,
        }
    }
}
