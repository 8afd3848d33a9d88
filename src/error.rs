//! Unified error type for the pulse engine.
//!
//! Only configuration-time calls can fail.  The interrupt-context paths
//! (timer expiry, zero-cross) are infallible and never produce one of these.
//! All variants are `Copy` so they can be returned from a critical section
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level engine error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The fixed-capacity channel registry has no free slot.
    RegistryFull { capacity: usize },
    /// A PWM frequency of zero was requested.
    InvalidFrequency(u16),
    /// The hardware timer could not be created (platform return code).
    TimerInit(i32),
    /// A GPIO could not be configured (platform return code).
    GpioConfig(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryFull { capacity } => {
                write!(f, "channel registry full ({capacity} channels)")
            }
            Self::InvalidFrequency(hz) => write!(f, "invalid PWM frequency: {hz} Hz"),
            Self::TimerInit(rc) => write!(f, "timer init failed (rc={rc})"),
            Self::GpioConfig(rc) => write!(f, "GPIO config failed (rc={rc})"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
