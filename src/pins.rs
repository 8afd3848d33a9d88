//! GPIO assignments for the reference dimmer board.
//!
//! Single source of truth for the firmware binary.  Library users pass
//! their own pin numbers to the engine.

use crate::app::ports::{EdgeType, PinId};

// ---------------------------------------------------------------------------
// Dimmer outputs (MOSFET / SSR gate drivers, active HIGH)
// ---------------------------------------------------------------------------

pub const CHANNEL_GPIOS: [PinId; 4] = [12, 13, 14, 15];

/// Gate drivers on this board switch on a HIGH level.
pub const CHANNELS_INVERTED: bool = false;

/// Default dithering amount for every channel.
pub const CHANNEL_DITHERING: u16 = 64;

// ---------------------------------------------------------------------------
// AC zero-cross detector (optocoupler, open collector)
// ---------------------------------------------------------------------------

pub const ZERO_CROSS_GPIO: PinId = 5;
pub const ZERO_CROSS_EDGE: EdgeType = EdgeType::Falling;

/// The DC variant of the board has no detector fitted.
pub const ZERO_CROSS_FITTED: bool = true;
