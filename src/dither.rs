//! Triangular dither profile.
//!
//! Spreads one requested duty over the eight sub-frames of a super-cycle so
//! that the time-average lands between two native duty steps:
//!
//! ```text
//!   frame:   0      1       2     3       4      5       6     7
//!   value:  d+a   d+a/2     d   d-a/2    d-a   d-a/2     d   d+a/2
//! ```
//!
//! Extremes (fully off / fully on) and a zero amount are never perturbed.

use crate::config::{DUTY_MAX, SUB_FRAMES};

/// Per-sub-frame duty thresholds for one channel.
pub type Thresholds = [u16; SUB_FRAMES];

/// Compute the eight sub-frame thresholds for `duty` dithered by `dithering`.
///
/// The amount is clamped to the headroom on both sides of `duty` so no frame
/// leaves `0..=DUTY_MAX`.
pub fn compute(duty: u16, dithering: u16) -> Thresholds {
    if duty == 0 || duty == DUTY_MAX || dithering == 0 {
        return [duty; SUB_FRAMES];
    }

    let amount = dithering.min(DUTY_MAX - duty).min(duty);
    let half = amount / 2;

    let rise = duty + half;
    let fall = duty - half;
    [duty + amount, rise, duty, fall, duty - amount, fall, duty, rise]
}
